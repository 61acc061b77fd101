use serde::{Deserialize, Serialize};

/// Previous/next targets of the detail view within the visible set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl Navigation {
    pub fn can_navigate_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn can_navigate_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Neighbours of `selected` in `visible`. Computed against the current order every
/// time, so a reordered set yields new targets.
pub fn navigate<S: AsRef<str>>(visible: &[S], selected: &str) -> Navigation {
    let Some(index) = visible.iter().position(|name| name.as_ref() == selected) else {
        return Navigation::default();
    };
    Navigation {
        previous: index
            .checked_sub(1)
            .and_then(|prev| visible.get(prev))
            .map(|name| name.as_ref().to_string()),
        next: visible.get(index + 1).map(|name| name.as_ref().to_string()),
    }
}
