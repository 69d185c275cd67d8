//! Local keyword heuristic
//!
//! Last-resort source of skill suggestions when every remote provider fails,
//! plus the categorisation tables used to complete analyses that omit a
//! requested target skill.

use crate::types::{
    DemonstrationMethod, SkillCategory, SkillMapping, SkillSpec,
    SkillSuggestions, SuggestionRequest, DEFAULT_COMPLEXITY,
};

type KeywordTable = &'static [(&'static str, &'static [&'static str])];

const TECHNICAL: KeywordTable = &[
    // frontend
    ("react", &["React", "JavaScript", "TypeScript", "HTML/CSS", "Redux", "React Router"]),
    ("vue", &["Vue.js", "JavaScript", "TypeScript", "HTML/CSS", "Vuex", "Vue Router"]),
    ("angular", &["Angular", "TypeScript", "JavaScript", "HTML/CSS", "RxJS", "Angular CLI"]),
    ("frontend", &["HTML/CSS", "JavaScript", "TypeScript", "Responsive Design", "UI/UX Design"]),
    ("web", &["HTML/CSS", "JavaScript", "TypeScript", "Web APIs", "Browser DevTools"]),
    // backend
    ("node", &["Node.js", "Express.js", "JavaScript", "TypeScript", "REST APIs", "NPM"]),
    ("python", &["Python", "Django", "Flask", "FastAPI", "SQLAlchemy", "Pandas"]),
    ("java", &["Java", "Spring Boot", "Maven", "JUnit", "Hibernate", "REST APIs"]),
    ("backend", &["REST APIs", "Database Design", "Server Architecture", "API Security"]),
    // databases
    ("database", &["SQL", "PostgreSQL", "MongoDB", "Database Design", "Query Optimization"]),
    ("sql", &["SQL", "PostgreSQL", "MySQL", "Database Design", "Data Modeling"]),
    ("mongodb", &["MongoDB", "NoSQL", "Database Design", "Aggregation Pipelines"]),
    ("postgres", &["PostgreSQL", "SQL", "Database Administration", "Performance Tuning"]),
    // cloud and devops
    ("aws", &["AWS", "Cloud Architecture", "EC2", "S3", "Lambda", "CloudFormation"]),
    ("cloud", &["Cloud Computing", "AWS", "Docker", "Kubernetes", "CI/CD"]),
    ("docker", &["Docker", "Containerization", "DevOps", "Kubernetes", "CI/CD"]),
    ("devops", &["DevOps", "CI/CD", "Docker", "Kubernetes", "Infrastructure as Code"]),
    // mobile
    ("mobile", &["React Native", "Flutter", "iOS Development", "Android Development", "Mobile UI/UX"]),
    ("ios", &["iOS Development", "Swift", "Xcode", "Mobile UI/UX", "App Store"]),
    ("android", &["Android Development", "Kotlin", "Java", "Android Studio", "Google Play"]),
    // data and AI
    ("data", &["Data Analysis", "SQL", "Python", "Pandas", "Data Visualization", "Statistics"]),
    ("analytics", &["Data Analytics", "SQL", "Python", "Tableau", "Power BI", "Statistics"]),
    ("machine learning", &["Machine Learning", "Python", "TensorFlow", "Scikit-learn", "Data Science"]),
    ("ai", &["Artificial Intelligence", "Machine Learning", "Python", "Neural Networks", "Deep Learning"]),
    // quality
    ("test", &["Unit Testing", "Integration Testing", "Test Automation", "Jest", "Cypress"]),
    ("quality", &["Quality Assurance", "Testing", "Code Review", "Bug Tracking", "Test Planning"]),
    // security
    ("security", &["Cybersecurity", "Authentication", "Authorization", "HTTPS/SSL", "Security Auditing"]),
    ("auth", &["Authentication", "Authorization", "JWT", "OAuth", "Security Best Practices"]),
];

const SOFT: KeywordTable = &[
    ("team", &["Team Collaboration", "Communication", "Leadership", "Conflict Resolution"]),
    ("manage", &["Project Management", "Leadership", "Time Management", "Strategic Planning"]),
    ("lead", &["Leadership", "Team Management", "Decision Making", "Mentoring"]),
    ("collaborate", &["Team Collaboration", "Communication", "Interpersonal Skills", "Teamwork"]),
    ("present", &["Presentation Skills", "Public Speaking", "Communication", "Storytelling"]),
    ("client", &["Client Relations", "Communication", "Customer Service", "Stakeholder Management"]),
    ("agile", &["Agile Methodology", "Scrum", "Team Collaboration", "Adaptability"]),
    ("problem", &["Problem Solving", "Critical Thinking", "Analytical Skills", "Troubleshooting"]),
    ("creative", &["Creativity", "Innovation", "Design Thinking", "Problem Solving"]),
    ("research", &["Research Skills", "Analytical Thinking", "Data Analysis", "Critical Thinking"]),
];

const LANGUAGE: KeywordTable = &[
    ("international", &["English", "Spanish", "French", "German"]),
    ("global", &["English", "Mandarin", "Spanish", "French"]),
    ("multilingual", &["English", "Spanish", "French", "German", "Mandarin"]),
    ("translation", &["English", "Spanish", "French", "German", "Translation Skills"]),
    ("localization", &["English", "Spanish", "French", "German", "Localization"]),
];

const CERTIFICATION: KeywordTable = &[
    ("aws", &["AWS Certified Solutions Architect", "AWS Certified Developer", "AWS Certified SysOps"]),
    ("cloud", &["AWS Certified Solutions Architect", "Google Cloud Professional", "Microsoft Azure Fundamentals"]),
    ("security", &["CompTIA Security+", "CISSP", "Certified Ethical Hacker"]),
    ("project", &["PMP", "Scrum Master", "Agile Certified Practitioner"]),
    ("data", &["Google Data Analytics", "Microsoft Power BI", "Tableau Desktop Specialist"]),
    ("python", &["Python Institute PCAP", "Google IT Automation with Python"]),
    ("javascript", &["JavaScript Algorithms and Data Structures", "React Developer Certification"]),
    ("agile", &["Scrum Master", "Agile Certified Practitioner", "SAFe Agilist"]),
];

/// Added to every project
const DEFAULT_SOFT: &[&str] = &[
    "Problem Solving",
    "Communication",
    "Time Management",
    "Attention to Detail",
    "Critical Thinking",
    "Adaptability",
    "Self-Motivation",
    "Continuous Learning",
];

/// Used when no technical keyword matched
const DEFAULT_TECHNICAL: &[&str] = &["Git", "Version Control", "Code Documentation", "Debugging"];

fn table(category: SkillCategory) -> KeywordTable {
    match category {
        SkillCategory::Technical => TECHNICAL,
        SkillCategory::Soft => SOFT,
        SkillCategory::Language => LANGUAGE,
        SkillCategory::Certification => CERTIFICATION,
    }
}

/// Suggest skills by keyword matching over description and goals
///
/// Never fails and never returns an empty soft-skill list.
#[must_use]
pub fn suggest(request: &SuggestionRequest, limit: usize) -> SkillSuggestions {
    let text = format!(
        "{} {}",
        request.project_description.to_lowercase(),
        request.project_goals.as_deref().unwrap_or_default().to_lowercase()
    );

    let mut suggestions = SkillSuggestions::default();
    for category in SkillCategory::ALL {
        let list = suggestions.category_mut(category);
        for (keyword, skills) in table(category) {
            if text.contains(*keyword) {
                list.extend(skills.iter().map(ToString::to_string));
            }
        }
    }

    suggestions
        .soft
        .extend(DEFAULT_SOFT.iter().map(ToString::to_string));
    if suggestions.technical.is_empty() {
        suggestions
            .technical
            .extend(DEFAULT_TECHNICAL.iter().map(ToString::to_string));
    }

    suggestions.normalized(limit)
}

const TECHNICAL_HINTS: &[&str] = &[
    "react", "node", "python", "javascript", "typescript", "sql", "aws", "docker", "git",
];
const SOFT_HINTS: &[&str] = &["leadership", "communication", "management", "teamwork", "problem solving"];
const LANGUAGE_HINTS: &[&str] = &["english", "spanish", "french", "german", "mandarin"];
const CERTIFICATION_HINTS: &[&str] = &["aws certified", "google cloud", "microsoft", "scrum", "pmp"];

fn contains_any(haystack: &str, hints: &[&str]) -> bool {
    hints.iter().any(|hint| haystack.contains(*hint))
}

/// Best-effort category for a skill name (technical when unknown)
#[must_use]
pub fn categorize_skill(name: &str) -> SkillCategory {
    let lower = name.to_lowercase();

    if contains_any(&lower, TECHNICAL_HINTS) {
        SkillCategory::Technical
    } else if contains_any(&lower, SOFT_HINTS) {
        SkillCategory::Soft
    } else if contains_any(&lower, LANGUAGE_HINTS) {
        SkillCategory::Language
    } else if contains_any(&lower, CERTIFICATION_HINTS) {
        SkillCategory::Certification
    } else {
        SkillCategory::Technical
    }
}

/// Best-effort demonstration method for a skill name (video when unknown)
#[must_use]
pub fn demonstration_method_for(name: &str) -> DemonstrationMethod {
    let lower = name.to_lowercase();

    if contains_any(&lower, &["communication", "leadership", "presentation"]) {
        DemonstrationMethod::Video
    } else if contains_any(&lower, &["documentation", "writing"]) {
        DemonstrationMethod::Documentation
    } else if contains_any(&lower, &["react", "code", "programming"]) {
        DemonstrationMethod::Code
    } else if contains_any(&lower, &["design", "ui", "ux"]) {
        DemonstrationMethod::Presentation
    } else {
        DemonstrationMethod::Video
    }
}

/// Descriptive entry for a target skill an analysis left out
#[must_use]
pub fn placeholder_skill(name: &str) -> SkillSpec {
    SkillSpec {
        ai_prompt: Some(format!(
            "Create a comprehensive demonstration showing {name} expertise through real-world application and problem-solving"
        )),
        ..SkillSpec::new(name, categorize_skill(name))
            .with_method(demonstration_method_for(name))
            .with_requirements(format!(
                "Demonstrate practical application of {name} through hands-on implementation and clear explanation of concepts"
            ))
    }
}

/// Mapping entry for a target skill an analysis left out
#[must_use]
pub fn placeholder_mapping(name: &str) -> SkillMapping {
    SkillMapping {
        skill: name.to_string(),
        demonstration_method: demonstration_method_for(name),
        complexity_level: DEFAULT_COMPLEXITY,
        verification_criteria: vec![
            format!("Clear explanation of {name} concepts"),
            "Practical implementation demonstration".to_string(),
            "Problem-solving approach showcase".to_string(),
            "Best practices application".to_string(),
        ],
    }
}
