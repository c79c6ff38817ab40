use log::{error, info};

/// User-facing notifications raised at action boundaries.
pub trait Notifier {
	/// Blocking error alert.
	fn alert(&self, message: &str);

	/// Success or status message.
	fn info(&self, message: &str) {
		info!("{message}");
	}

	/// Ask the user to confirm a destructive action.
	fn confirm(&self, _message: &str) -> bool {
		true
	}
}

/// `window.alert` / `window.confirm` in the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserAlert;

impl Notifier for BrowserAlert {
	fn alert(&self, message: &str) {
		let Some(window) = web_sys::window() else {
			error!("no window for alert: {message}");
			return;
		};
		if let Err(e) = window.alert_with_message(message) {
			error!("alert failed for {message:?}: {e:?}");
		}
	}

	fn info(&self, message: &str) {
		info!("{message}");
		self.alert(message);
	}

	fn confirm(&self, message: &str) -> bool {
		web_sys::window()
			.and_then(|w| w.confirm_with_message(message).ok())
			.unwrap_or(false)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::cell::RefCell;

	use super::Notifier;

	/// Records every message instead of showing it.
	#[derive(Default)]
	pub(crate) struct RecordingNotifier {
		pub(crate) alerts: RefCell<Vec<String>>,
		pub(crate) infos: RefCell<Vec<String>>,
		pub(crate) refuse_confirm: bool,
	}

	impl RecordingNotifier {
		pub(crate) fn alert_count(&self) -> usize {
			self.alerts.borrow().len()
		}
	}

	impl Notifier for RecordingNotifier {
		fn alert(&self, message: &str) {
			self.alerts.borrow_mut().push(message.to_string());
		}

		fn info(&self, message: &str) {
			self.infos.borrow_mut().push(message.to_string());
		}

		fn confirm(&self, _message: &str) -> bool {
			!self.refuse_confirm
		}
	}
}
