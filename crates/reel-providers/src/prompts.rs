//! Prompt builders for direct model invocation
//!
//! Each prompt ends with the JSON shape the answer must follow; the model
//! adapter extracts the first `{` to the last `}` of the reply.

use reel_core::{AnalysisRequest, SuggestionRequest, VerificationRequest};

const NOT_SPECIFIED: &str = "Not specified";

/// Prompt asking for per-category skill suggestions
#[must_use]
pub fn suggestion_prompt(request: &SuggestionRequest) -> String {
    format!(
        r#"Based on this project description, suggest relevant skills that would be needed and could be demonstrated:

Project: {description}
Goals: {goals}

Please provide skill suggestions in the following JSON format:
{{
  "technical": [<array of technical skills>],
  "soft": [<array of soft skills>],
  "language": [<array of language skills if relevant>],
  "certification": [<array of relevant certifications>]
}}

Focus on:
1. Skills directly applicable to this project
2. Modern, in-demand skills in the relevant industry
3. Skills that can be practically demonstrated through project work
4. Both foundational and advanced skills for comprehensive coverage

Limit to 8-10 skills per category, prioritizing the most relevant ones.
"#,
        description = request.project_description,
        goals = request.project_goals.as_deref().unwrap_or(NOT_SPECIFIED),
    )
}

/// Prompt asking for a full scope analysis covering every target skill
#[must_use]
pub fn analysis_prompt(request: &AnalysisRequest) -> String {
    let mut prompt = format!(
        "You are an AI project analysis expert. Analyze the following project and provide a comprehensive assessment.\n\n\
         Project Description: {}\n\
         Project Goals: {}\n\
         Target Skills: {}\n\n",
        request.project_description,
        request.project_goals.as_deref().unwrap_or(NOT_SPECIFIED),
        request.target_skills.join(", "),
    );
    prompt.push_str(
        r#"Please provide a detailed analysis in the following JSON format:
{
  "clarity_score": <number 1-10>,
  "feasibility_score": <number 1-10>,
  "identified_risks": [<array of risk strings>],
  "suggested_technologies": [<array of technology strings>],
  "detected_skills": [
    {
      "id": "<unique_id>",
      "name": "<skill_name>",
      "category": "<technical|soft|language|certification>",
      "proficiency": "<beginner|intermediate|advanced|expert|master>",
      "demonstrationMethod": "<code|video|documentation|presentation|live-demo>",
      "requirements": "<specific requirements for demonstrating this skill>",
      "aiPrompt": "<AI verification strategy for this skill>"
    }
  ],
  "skill_mapping": [
    {
      "skill": "<skill_name>",
      "demonstration_method": "<method>",
      "complexity_level": <number 1-5>,
      "verification_criteria": [<array of criteria strings>]
    }
  ]
}

Focus on:
1. Realistic assessment of project clarity and feasibility
2. Identification of potential risks and challenges
3. Technology recommendations based on project requirements
4. Detailed skill analysis with appropriate demonstration methods
5. AI-powered verification strategies for each skill
6. Complexity assessment for skill demonstrations

"#,
    );
    prompt.push_str("Ensure all skills from the target list are included in the analysis.\n");
    prompt
}

/// Prompt asking for a rating of one skill against an evidence artifact
#[must_use]
pub fn verification_prompt(request: &VerificationRequest) -> String {
    format!(
        r#"You are an AI skill verification expert. Analyze a {method} demonstration for the skill "{skill}".

Evidence URL: {url}
Evidence Type: {evidence_type}

Please provide analysis in this JSON format:
{{
  "rating": <number 1-5>,
  "feedback": "<detailed feedback string>"
}}

Base the analysis on:
1. Skill complexity and requirements
2. Best practices for demonstrating {skill}
3. Common areas for improvement in skill demonstrations

Provide constructive feedback and realistic ratings.
"#,
        method = request.demonstration_method,
        skill = request.skill_name,
        url = request.evidence_url,
        evidence_type = request.evidence_type,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::{DemonstrationMethod, ProjectId, SkillId, VERIFY_ACTION};

    #[test]
    fn suggestion_prompt_defaults_missing_goals() {
        let prompt = suggestion_prompt(&SuggestionRequest {
            project_description: "A chat app".into(),
            project_goals: None,
        });
        assert!(prompt.contains("Project: A chat app"));
        assert!(prompt.contains("Goals: Not specified"));
        assert!(prompt.contains("\"certification\""));
    }

    #[test]
    fn analysis_prompt_lists_target_skills() {
        let prompt = analysis_prompt(&AnalysisRequest {
            project_description: "A chat app".into(),
            project_goals: Some("Ship it".into()),
            target_skills: vec!["React".into(), "Leadership".into()],
        });
        assert!(prompt.contains("Target Skills: React, Leadership"));
        assert!(prompt.contains("Project Goals: Ship it"));
        assert!(prompt.trim_end().ends_with("included in the analysis."));
    }

    #[test]
    fn verification_prompt_names_skill_and_evidence() {
        let prompt = verification_prompt(&VerificationRequest {
            action: VERIFY_ACTION.into(),
            project_id: ProjectId::from("project_1"),
            skill_id: SkillId::from("skill_1"),
            skill_name: "SQL".into(),
            demonstration_method: DemonstrationMethod::Video,
            evidence_url: "file:///tmp/demo.mp4".into(),
            evidence_type: "video/mp4".into(),
        });
        assert!(prompt.contains("video demonstration for the skill \"SQL\""));
        assert!(prompt.contains("Evidence URL: file:///tmp/demo.mp4"));
    }
}
