use leptos::prelude::*;
use log::info;

use crate::components::station_designer::StationDesignerView;
use crate::config::AppConfig;
use crate::session;

/// The designer for the logged-in user, or a prompt to log in.
#[component]
pub fn DesignerPage() -> impl IntoView {
	let config = AppConfig::from_env();
	let user = session::current_user();
	match &user {
		Some(u) => info!("designer opened for user {}", u.user_id),
		None => info!("designer opened without a session"),
	}
	let greeting = user
		.as_ref()
		.and_then(|u| u.first_name.clone())
		.map(|name| format!("Welcome back, {name}"));
	let logged_out = user.is_none();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<Show when=move || logged_out>
				<div class="login-banner">
					"You are not logged in. Designs can be built but not saved or loaded."
				</div>
			</Show>
			{greeting.map(|text| view! { <p class="greeting">{text}</p> })}
			<StationDesignerView api_base_url=config.api_base_url user=user />
		</ErrorBoundary>
	}
}
