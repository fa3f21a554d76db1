//! Interactive datacentre selection against a fetched catalogue.
//!
//! Offers the provider's recommendation first and falls back to manual
//! selection by name when the recommendation is absent or declined.

use thiserror::Error;

use crate::prompt::{PromptError, Prompter, is_affirmative};
use crate::provider::{Datacentre, DatacentreCatalogue};

/// Final choice produced by [`select_datacentre`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    /// Provider identifier of the chosen datacentre.
    pub id: u64,
    /// Name of the chosen datacentre, kept for confirmation output.
    pub name: String,
}

/// Errors raised while selecting a datacentre.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SelectionError {
    /// Raised when the catalogue holds no entries to choose from.
    #[error("no datacentres available for selection")]
    NoDatacentres,
    /// Raised when the interactive prompt fails.
    #[error("datacentre selection prompt failed")]
    Prompt(#[from] PromptError),
}

/// Selects exactly one datacentre from `catalogue`.
///
/// When the catalogue carries a resolvable recommendation the user is asked
/// to accept it; otherwise, or on decline, entries are listed by name and
/// the user is re-prompted until an exact match is entered. Unknown names
/// are not reported as errors, the listing is simply shown again.
///
/// # Errors
///
/// Returns [`SelectionError::NoDatacentres`] when the catalogue is empty,
/// since the manual loop could never terminate, and
/// [`SelectionError::Prompt`] when the interactive prompt fails.
pub fn select_datacentre<P: Prompter>(
    prompter: &P,
    catalogue: &DatacentreCatalogue,
) -> Result<Selection, SelectionError> {
    if catalogue.is_empty() {
        return Err(SelectionError::NoDatacentres);
    }

    let chosen = match catalogue.lookup_recommended() {
        Ok(recommended) => {
            if accepts_recommendation(prompter, recommended)? {
                recommended.clone()
            } else {
                select_manually(prompter, catalogue)?
            }
        }
        Err(_) => {
            prompter.inform("Recommendation not found, manual selection required")?;
            select_manually(prompter, catalogue)?
        }
    };

    prompter.inform(&format!("Selected {}", chosen.name))?;
    Ok(Selection {
        id: chosen.id,
        name: chosen.name,
    })
}

fn accepts_recommendation<P: Prompter>(
    prompter: &P,
    recommended: &Datacentre,
) -> Result<bool, PromptError> {
    let prompt = format!(
        "Select the recommended datacentre? ({} | {}) [Y/n] ",
        recommended.name, recommended.location
    );
    let response = prompter.read_line(&prompt)?;
    Ok(is_affirmative(&response))
}

fn select_manually<P: Prompter>(
    prompter: &P,
    catalogue: &DatacentreCatalogue,
) -> Result<Datacentre, SelectionError> {
    loop {
        prompter.inform("Manual datacentre selection:")?;
        for entry in catalogue.entries() {
            prompter.inform(&entry.name)?;
        }

        let response = prompter.read_line("Please enter a DC name: ")?;
        if let Ok(entry) = catalogue.lookup_by_name(response.trim()) {
            return Ok(entry.clone());
        }
    }
}
