//! Alert messages that htmx swaps into the page's alert container.
//!
//! Alerts are rendered as an out-of-band swap so that any endpoint can show one
//! regardless of the element that made the request.

use maud::{Markup, html};

/// An alert message to show the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action completed.
    Success {
        /// The headline of the alert.
        message: String,
        /// Extra information shown below the headline.
        details: String,
    },
    /// The action completed but the user should check something.
    Warning {
        /// The headline of the alert.
        message: String,
        /// Extra information shown below the headline.
        details: String,
    },
    /// The action failed.
    Error {
        /// The headline of the alert.
        message: String,
        /// Extra information shown below the headline.
        details: String,
    },
}

impl Alert {
    /// Render the alert as a replacement for `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (message, details, container_style, icon) = match self {
            Alert::Success { message, details } => (
                message,
                details,
                "flex items-start p-4 rounded border text-green-800 bg-green-50 \
                border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                "✓",
            ),
            Alert::Warning { message, details } => (
                message,
                details,
                "flex items-start p-4 rounded border text-yellow-800 bg-yellow-50 \
                border-yellow-300 dark:bg-gray-800 dark:text-yellow-300 dark:border-yellow-800",
                "!",
            ),
            Alert::Error { message, details } => (
                message,
                details,
                "flex items-start p-4 rounded border text-red-800 bg-red-50 \
                border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                "✕",
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    span class="shrink-0 me-3 font-bold" { (icon) }

                    div class="flex-1"
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-3 text-sm font-medium"
                        aria-label="Close"
                        onclick="document.getElementById('alert-container').classList.add('hidden')"
                    {
                        "✕"
                    }
                }
            }
        }
    }
}
