use leptos::prelude::*;
use leptos_router::components::A;

use crate::error::CleanGraphError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
	Info,
	Error,
	/// The view can no longer be trusted; only navigating away helps.
	Fatal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
	pub severity: Severity,
	pub message: String,
}

impl Notice {
	pub fn info(message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Info,
			message: message.into(),
		}
	}

	/// Error notice for a failed operation, fatal when the error is.
	pub fn failure(what: &str, error: &CleanGraphError) -> Self {
		Self {
			severity: if error.is_fatal() {
				Severity::Fatal
			} else {
				Severity::Error
			},
			message: format!("{what} failed: {error}"),
		}
	}

	fn class(&self) -> &'static str {
		match self.severity {
			Severity::Info => "notice notice-info",
			Severity::Error => "notice notice-error",
			Severity::Fatal => "notice notice-fatal",
		}
	}
}

/// App-wide banner slot, provided as context so notices survive navigation.
#[derive(Clone, Copy, Debug)]
pub struct Notifications(pub RwSignal<Option<Notice>>);

impl Notifications {
	pub fn notify(&self, notice: Notice) {
		self.0.set(Some(notice));
	}

	pub fn dismiss(&self) {
		self.0.set(None);
	}
}

/// Shows the latest notice until dismissed.
#[component]
pub fn NotificationBanner(notifications: Notifications) -> impl IntoView {
	move || {
		notifications.0.get().map(|notice| {
			let fatal = notice.severity == Severity::Fatal;
			view! {
				<div class=notice.class() role="alert">
					<span>{notice.message.clone()}</span>
					<Show when=move || fatal>
						<A href="/">"Back to start"</A>
					</Show>
					<button on:click=move |_| notifications.dismiss()>"Dismiss"</button>
				</div>
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::ItemId;

	#[test]
	fn reanchor_failure_is_a_fatal_notice() {
		let error = CleanGraphError::ReanchorFailed {
			node_id: ItemId::from("b"),
			source: Box::new(CleanGraphError::Status {
				endpoint: "/graph/g1/b".into(),
				status: 500,
			}),
		};
		let notice = Notice::failure("merge", &error);
		assert_eq!(notice.severity, Severity::Fatal);
		assert!(notice.message.starts_with("merge failed: "));

		let busy = CleanGraphError::NoWindow;
		assert_eq!(Notice::failure("review", &busy).severity, Severity::Error);
	}
}
