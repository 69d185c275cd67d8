//! Project plan and per-skill hints derived from an analysis

use crate::types::{AnalysisResult, DemonstrationMethod, SkillCategory, SkillSpec};
use serde::Serialize;

/// Demonstration hint for one detected skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFeedback {
    pub skill: String,
    pub hint: String,
}

/// One hint per detected skill, in detection order
#[must_use]
pub fn skill_feedback(analysis: &AnalysisResult) -> Vec<SkillFeedback> {
    analysis
        .detected_skills
        .iter()
        .map(|skill| SkillFeedback {
            skill: skill.name.clone(),
            hint: hint_for(skill, analysis.complexity_of(&skill.name)),
        })
        .collect()
}

fn hint_for(skill: &SkillSpec, complexity: u8) -> String {
    let name = &skill.name;
    match (skill.demonstration_method, skill.category) {
        _ if complexity >= 4 => {
            "High complexity skill - consider breaking into smaller demonstrations or focusing on specific aspects"
                .to_string()
        }
        (DemonstrationMethod::Code, SkillCategory::Technical) => {
            format!("Perfect for code demonstration - build a feature that showcases {name} expertise")
        }
        (DemonstrationMethod::Video, SkillCategory::Soft) => {
            format!("Great for video demo - show real examples of {name} in action")
        }
        (method, _) => format!("Well-suited for {method} demonstration"),
    }
}

/// Ordered plan: setup steps, one implementation step per skill, wrap-up steps
#[must_use]
pub fn build_plan(project_name: &str, analysis: &AnalysisResult) -> Vec<String> {
    let mut plan = vec![
        format!("Project Setup: Initialize the {project_name} project with proper structure and dependencies"),
        "Requirements Analysis: Define detailed specifications and user stories based on AI recommendations".to_string(),
        "Architecture Design: Plan the system architecture using suggested technologies".to_string(),
    ];
    plan.extend(
        analysis
            .detected_skills
            .iter()
            .map(|skill| format!("{} Implementation: {}", skill.name, skill.requirements)),
    );
    plan.extend(
        [
            "Integration Testing: Ensure all components work together seamlessly",
            "AI-Powered Documentation: Create comprehensive project documentation with skill verification evidence",
            "Quality Assurance: Conduct thorough testing and prepare for AI skill verification",
            "Deployment & Presentation: Deploy the project and present skill demonstrations for AI analysis",
        ]
        .map(String::from),
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SkillMapping, DEFAULT_SCORE};
    use pretty_assertions::assert_eq;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            clarity_score: DEFAULT_SCORE,
            feasibility_score: DEFAULT_SCORE,
            identified_risks: vec![],
            suggested_technologies: vec![],
            detected_skills: vec![
                SkillSpec::new("React", SkillCategory::Technical)
                    .with_method(DemonstrationMethod::Code)
                    .with_requirements("Build a dashboard"),
                SkillSpec::new("Leadership", SkillCategory::Soft),
                SkillSpec::new("Kubernetes", SkillCategory::Technical),
                SkillSpec::new("Spanish", SkillCategory::Language)
                    .with_method(DemonstrationMethod::Presentation),
            ],
            skill_mapping: vec![SkillMapping {
                skill: "Kubernetes".into(),
                demonstration_method: DemonstrationMethod::Video,
                complexity_level: 5,
                verification_criteria: vec![],
            }],
        }
    }

    #[test]
    fn hints_follow_complexity_then_method() {
        let hints: Vec<_> = skill_feedback(&analysis()).into_iter().map(|f| f.hint).collect();

        assert_eq!(
            hints,
            vec![
                "Perfect for code demonstration - build a feature that showcases React expertise".to_string(),
                "Great for video demo - show real examples of Leadership in action".to_string(),
                "High complexity skill - consider breaking into smaller demonstrations or focusing on specific aspects".to_string(),
                "Well-suited for presentation demonstration".to_string(),
            ]
        );
    }

    #[test]
    fn plan_wraps_one_step_per_skill() {
        let plan = build_plan("Portfolio", &analysis());

        assert_eq!(plan.len(), 3 + 4 + 4);
        assert!(plan[0].contains("Initialize the Portfolio project"));
        assert_eq!(plan[3], "React Implementation: Build a dashboard");
        assert!(plan[10].starts_with("Deployment & Presentation"));
    }
}
