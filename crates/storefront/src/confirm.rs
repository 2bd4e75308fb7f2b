//! Confirmation gate for destructive links and buttons.
//!
//! Elements carrying `data-confirm-delete` ask the user before their default
//! action runs. The attribute value is the prompt text.

/// Prompt used when the attribute is present but empty.
pub const DEFAULT_CONFIRM_MESSAGE: &str = "Êtes-vous sûr de vouloir supprimer cet élément ?";

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// What to do with the pending click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    /// Let the navigation or form submission go ahead.
    Proceed,
    /// Prevent the default action.
    Cancel,
}

/// Ask for confirmation using the element's `data-confirm-delete` value.
pub fn confirm_delete(attribute: Option<&str>, confirm: &impl Confirm) -> DeleteDecision {
    let message = attribute
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_CONFIRM_MESSAGE);

    if confirm.confirm(message) {
        DeleteDecision::Proceed
    } else {
        tracing::debug!(message, "Delete cancelled by user");
        DeleteDecision::Cancel
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn test_declined_cancels() {
        assert_eq!(confirm_delete(Some("Supprimer ?"), &|_: &str| false), DeleteDecision::Cancel);
    }

    #[test]
    fn test_accepted_proceeds() {
        assert_eq!(confirm_delete(None, &|_: &str| true), DeleteDecision::Proceed);
    }

    #[test]
    fn test_prompt_text() {
        let asked = RefCell::new(Vec::new());
        let confirm = |m: &str| {
            asked.borrow_mut().push(m.to_string());
            true
        };
        confirm_delete(Some("Supprimer ce produit ?"), &confirm);
        confirm_delete(Some(""), &confirm);
        confirm_delete(None, &confirm);
        assert_eq!(
            *asked.borrow(),
            vec![
                "Supprimer ce produit ?".to_string(),
                DEFAULT_CONFIRM_MESSAGE.to_string(),
                DEFAULT_CONFIRM_MESSAGE.to_string(),
            ]
        );
    }
}
