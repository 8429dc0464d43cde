//! Prompt templates for the three workflow stages
//!
//! Every stage sends one system prompt (role, journal examples, requirements)
//! and one human message carrying the session fields. The human summary that
//! goes into the transcript is shorter than the prompt itself.

use crate::state_machine::{SessionRecord, Stage};
use std::fmt::Write;

const GENERATE_SYSTEM: &str = r"You are a senior academic researcher with extensive experience writing papers for top venues. Your job is to write the framework section of a paper.

Based on the given research topic, methodology, and target journal, write only the framework section. Do not write the introduction, related work, experiments, conclusion, or references. The framework must be clearly structured and logically rigorous.";

const GENERATE_EXAMPLES_INTRO: &str = "Framework sections from papers published in the target journal:";

const GENERATE_EXAMPLES_OUTRO: &str = "Study how the framework sections above are written. Analyse their structure, ignoring their content, and follow that structure in your own framework.";

const GENERATE_REQUIREMENTS: &str = r"Requirements:
- The framework meets the academic standards of the target journal
- The logical structure is clear with distinct levels
- No subjective statements; write from an objective point of view
- The research method matches the framework
- Professional and precise language
- Avoid phrasing that reads as machine-generated";

const REFINE_SYSTEM: &str = r"You are a senior academic researcher responsible for refining and improving research frameworks.

Your task is to improve an existing framework so that it is more complete, more logically rigorous, and better aligned with the requirements of the target journal.";

const REFINE_REQUIREMENTS: &str = r"Refinement requirements:
1. Improve the logical structure and the relationships between levels
2. Strengthen the theoretical grounding and literature support
3. Sharpen concept definitions and the operationalisation of variables
4. Complete the research design and methodology
5. Reinforce the theoretical contribution and novelty
6. Ensure the academic standards of the journal are met

Refine the current framework.";

const VALIDATE_SYSTEM: &str = r"You are a senior reviewer for academic journals, responsible for assessing the quality and compliance of research frameworks.

Your task is to assess the framework thoroughly against the academic standards and requirements of the target journal.";

const VALIDATE_REQUIREMENTS: &str = r"Assessment dimensions:
1. Theoretical contribution and novelty
2. Logical structure and completeness
3. Literature base and theoretical grounding
4. Soundness of the research design
5. Suitability of the methodology
6. Academic writing conventions
7. Fit with the journal's requirements

Give a detailed assessment and suggestions for improvement.";

const JOURNAL_FORMAT_INTRO: &str = "Example format from the target journal:";

/// A rendered stage prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub human: String,
}

/// Render the prompt for `stage`.
///
/// `examples` is the few-shot block for the target journal; when `None` the
/// example section is left out entirely.
pub fn render(stage: Stage, record: &SessionRecord, examples: Option<&str>) -> RenderedPrompt {
    let (role, requirements, examples_intro) = match stage {
        Stage::Generate => (GENERATE_SYSTEM, GENERATE_REQUIREMENTS, GENERATE_EXAMPLES_INTRO),
        Stage::Refine => (REFINE_SYSTEM, REFINE_REQUIREMENTS, JOURNAL_FORMAT_INTRO),
        Stage::Validate => (VALIDATE_SYSTEM, VALIDATE_REQUIREMENTS, JOURNAL_FORMAT_INTRO),
    };

    let mut system = String::from(role);
    if let Some(examples) = examples.map(str::trim).filter(|e| !e.is_empty()) {
        let _ = write!(system, "\n\n{examples_intro}\n{examples}");
        if stage == Stage::Generate {
            let _ = write!(system, "\n\n{GENERATE_EXAMPLES_OUTRO}");
        }
    }
    let _ = write!(system, "\n\n{requirements}");

    RenderedPrompt {
        system,
        human: render_human(stage, record),
    }
}

fn render_human(stage: Stage, record: &SessionRecord) -> String {
    let mut human = String::new();
    let lead = match stage {
        Stage::Generate => "Write a research framework for the following study:",
        Stage::Refine => "Refine the following research framework:",
        Stage::Validate => "Assess the quality of the following research framework:",
    };
    let _ = writeln!(human, "{lead}\n");
    let _ = writeln!(human, "Research topic: {}", record.topic());
    let _ = writeln!(human, "Methodology: {}", record.methodology());
    let _ = write!(human, "Target journal: {}", record.journal_requirements());

    match stage {
        Stage::Generate => {
            let _ = write!(human, "\n\nProduce a complete research framework.");
        }
        Stage::Refine => {
            let _ = write!(
                human,
                "\nCurrent framework:\n{}\n\nProduce the refined framework.",
                record.current_framework()
            );
        }
        Stage::Validate => {
            let _ = write!(human, "\nFramework:\n{}", record.current_framework());
        }
    }
    human
}

/// Human turn recorded in the transcript for a stage
pub fn transcript_summary(stage: Stage, record: &SessionRecord) -> String {
    match stage {
        Stage::Generate => format!(
            "Generate a research framework for my study:\nTopic: {}\nMethodology: {}\nJournal: {}",
            record.topic(),
            record.methodology(),
            record.journal_requirements()
        ),
        Stage::Refine => "Refine the current framework".to_string(),
        Stage::Validate => "Assess the quality of the current framework".to_string(),
    }
}
