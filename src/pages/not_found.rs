use leptos::prelude::*;

/// 404 page linking back to the designer.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Lost in space"</h1>
			<p>"This page drifted out of orbit."</p>
			<a href="/">"Back to the designer"</a>
		</div>
	}
}
