//! Interactive prompting
//!
//! Commands talk to the user only through the [`Prompter`] trait so the
//! orchestration logic can run against scripted answers in tests.

use color_eyre::eyre::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use pharos_core::{validate_project_name, ContractType, Framework, Frontend, InitAnswers};
use zeroize::Zeroizing;

/// Source of answers to interactive questions
pub trait Prompter {
    /// Free-text answer; an empty string when the user just presses Enter
    /// and there is no default.
    fn input(&self, message: &str, default: Option<&str>) -> Result<String>;

    /// Index of the chosen item
    fn select(&self, message: &str, items: &[&str], default: usize) -> Result<usize>;

    fn confirm(&self, message: &str, default: bool) -> Result<bool>;

    /// Hidden input for keys and secret URIs
    fn secret(&self, message: &str) -> Result<Zeroizing<String>>;
}

/// Prompts on the controlling terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true);
        if let Some(default) = default.filter(|d| !d.is_empty()) {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn select(&self, message: &str, items: &[&str], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(default)
            .interact()?)
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()?)
    }

    fn secret(&self, message: &str) -> Result<Zeroizing<String>> {
        let value = Password::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()?;
        Ok(Zeroizing::new(value))
    }
}

// =============================================================================
// Init Flow
// =============================================================================

/// Answers supplied up front on the command line
#[derive(Debug, Clone, Default)]
pub struct InitPreset {
    pub project_name: Option<String>,
    pub contract_type: Option<ContractType>,
    pub framework: Option<Framework>,
    pub frontend: Option<Frontend>,
}

/// Ask the init questions in order, skipping those already answered.
///
/// The framework question is only asked for Solidity projects. An empty
/// directory name fails immediately instead of re-prompting.
pub fn collect_init_answers(prompter: &dyn Prompter, preset: &InitPreset) -> Result<InitAnswers> {
    let project_name = match &preset.project_name {
        Some(name) => name.clone(),
        None => prompter.input("Enter a name for your directory", None)?,
    };
    let project_name = validate_project_name(&project_name)?;

    let contract_type = match preset.contract_type {
        Some(contract_type) => contract_type,
        None => {
            let labels = ContractType::ALL.map(|c| c.label());
            ContractType::ALL[prompter.select("Choose a contract type", &labels, 0)?]
        }
    };

    let framework = match (contract_type, preset.framework) {
        (ContractType::SolidityEvm, Some(framework)) => Some(framework),
        (ContractType::SolidityEvm, None) => {
            let labels = Framework::ALL.map(|f| f.label());
            Some(Framework::ALL[prompter.select("Select a development framework", &labels, 0)?])
        }
        (ContractType::RustWasm, framework) => framework,
    };

    let frontend = match preset.frontend {
        Some(frontend) => frontend,
        None => {
            let labels = Frontend::ALL.map(|f| f.label());
            Frontend::ALL[prompter.select("Choose a frontend framework", &labels, 0)?]
        }
    };

    Ok(InitAnswers {
        project_name,
        contract_type,
        framework,
        frontend,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::{Answer, ScriptedPrompter};
    use super::*;
    use pharos_core::Error;

    #[test]
    fn test_solidity_flow_asks_framework() {
        let prompter = ScriptedPrompter::new([
            Answer::Text("my-dapp".to_string()),
            Answer::Choice(0),
            Answer::Choice(1),
            Answer::Choice(0),
        ]);

        let answers = collect_init_answers(&prompter, &InitPreset::default()).unwrap();

        assert_eq!(answers.project_name, "my-dapp");
        assert_eq!(answers.contract_type, ContractType::SolidityEvm);
        assert_eq!(answers.framework, Some(Framework::Foundry));
        assert_eq!(answers.frontend, Frontend::ReactVite);
        assert_eq!(prompter.asked().len(), 4);
    }

    #[test]
    fn test_rust_flow_skips_framework() {
        let prompter = ScriptedPrompter::new([
            Answer::Text("flipper".to_string()),
            Answer::Choice(1),
            Answer::Choice(2),
        ]);

        let answers = collect_init_answers(&prompter, &InitPreset::default()).unwrap();

        assert_eq!(answers.contract_type, ContractType::RustWasm);
        assert_eq!(answers.framework, None);
        assert_eq!(answers.frontend, Frontend::None);
        assert!(!prompter
            .asked()
            .iter()
            .any(|question| question.contains("development framework")));
    }

    #[test]
    fn test_empty_name_fails_before_other_questions() {
        let prompter = ScriptedPrompter::new([Answer::Text("   ".to_string())]);

        let err = collect_init_answers(&prompter, &InitPreset::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ValidationFailed(_))
        ));
        assert_eq!(prompter.asked().len(), 1);
    }

    #[test]
    fn test_preset_answers_are_not_asked() {
        let prompter = ScriptedPrompter::default();
        let preset = InitPreset {
            project_name: Some("my-dapp".to_string()),
            contract_type: Some(ContractType::SolidityEvm),
            framework: Some(Framework::Hardhat),
            frontend: Some(Frontend::Vue),
        };

        let answers = collect_init_answers(&prompter, &preset).unwrap();

        assert_eq!(answers.framework, Some(Framework::Hardhat));
        assert_eq!(answers.frontend, Frontend::Vue);
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_rust_preset_with_framework_is_rejected_on_build() {
        let prompter = ScriptedPrompter::default();
        let preset = InitPreset {
            project_name: Some("flipper".to_string()),
            contract_type: Some(ContractType::RustWasm),
            framework: Some(Framework::Foundry),
            frontend: Some(Frontend::None),
        };

        let answers = collect_init_answers(&prompter, &preset).unwrap();
        assert!(answers.into_config().is_err());
    }
}
