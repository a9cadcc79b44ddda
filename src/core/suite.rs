//! Question suites.
//!
//! A suite is an ordered list of categories, each with questions to ask about
//! the same data context. Suites are defined in YAML; a built-in suite covers
//! direct lookups through questions the data cannot answer.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A named set of question categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSuite {
    /// Suite name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Ordered categories
    pub categories: Vec<QuestionCategory>,
}

/// Questions sharing an expected outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionCategory {
    /// Category label (e.g. "Impossible (Fabricated)")
    pub name: String,

    /// Questions in asking order
    pub questions: Vec<String>,
}

impl QuestionSuite {
    /// Load a suite from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    /// Parse a suite from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse suite YAML")
    }

    /// Validate the suite definition
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Suite name cannot be empty");
        }

        if self.categories.is_empty() {
            anyhow::bail!("Suite must have at least one category");
        }

        for (i, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                anyhow::bail!("Category {} has an empty name", i);
            }
            if category.questions.is_empty() {
                anyhow::bail!("Category '{}' has no questions", category.name);
            }
            if let Some(idx) = category.questions.iter().position(|q| q.trim().is_empty()) {
                anyhow::bail!("Category '{}' question {} is empty", category.name, idx);
            }
        }

        Ok(())
    }

    /// Iterate (category, question) pairs in asking order
    pub fn questions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().flat_map(|c| {
            c.questions
                .iter()
                .map(move |q| (c.name.as_str(), q.as_str()))
        })
    }

    /// Total number of questions
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.questions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The built-in transactions suite
    pub fn builtin() -> Self {
        let category = |name: &str, questions: &[&str]| QuestionCategory {
            name: name.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        };

        Self {
            name: "transactions".to_string(),
            description: "Grounded lookups, multi-step reasoning and fabrication checks over a transactions CSV"
                .to_string(),
            categories: vec![
                category(
                    "Easy (Direct Lookup - Grounded)",
                    &["What was the total amount for transaction 918e4a7a-29d0-4565-99d9-b6abf8e54be5?"],
                ),
                category(
                    "Medium (Simple - Grounded)",
                    &["How many transactions were paid for with Cash?"],
                ),
                category(
                    "Hard (Multi-step - Grounded)",
                    &["What is the category of the product with the highest unit price in the dataset?"],
                ),
                category(
                    "Impossible (Fabricated)",
                    &["Was transaction fff306b2-c7d8-4b79-8abe-e77e93172e08 returned by the customer?"],
                ),
                category(
                    "Generate",
                    &["Generate another sample row for the dataset. Make sure all the fields are valid."],
                ),
            ],
        }
    }
}
