use std::rc::Rc;

use leptos::callback::Callback;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::session::CurrentUser;

use super::alert::{BrowserAlert, Notifier};
use super::canvas::DesignCanvas;
use super::catalog::{PartCatalog, PartDefinition};
use super::clock::{Clock, SystemClock, new_design_name};
use super::designer::{CanvasIntent, StationDesigner};
use super::persistence::{HttpTransport, PersistenceGateway};
use super::types::{DesignId, SavedDesign};
use super::viewport::ViewportHandle;

type Gateway = PersistenceGateway<HttpTransport, BrowserAlert>;

/// Background refreshes only run for a logged-in user; the page already
/// tells everyone else to log in.
fn can_use_store(user: Option<&CurrentUser>) -> bool {
	user.is_some_and(|u| !u.user_id.trim().is_empty())
}

/// Header, part palette, canvas and saved-design list for one user.
#[component]
pub fn StationDesignerView(
	#[prop(into)] api_base_url: String,
	user: Option<CurrentUser>,
	#[prop(default = PartCatalog::station())] catalog: PartCatalog,
) -> impl IntoView {
	let designer = RwSignal::new(StationDesigner::new(catalog));
	let saved = RwSignal::new(Vec::<SavedDesign>::new());
	let loading = RwSignal::new(false);
	let user = StoredValue::new(user);
	let gateway: StoredValue<Rc<Gateway>, LocalStorage> = StoredValue::new_local(Rc::new(
		PersistenceGateway::new(HttpTransport::new(api_base_url), BrowserAlert),
	));
	let viewport: StoredValue<ViewportHandle, LocalStorage> =
		StoredValue::new_local(ViewportHandle::new());

	designer.update(|d| d.set_design_name(new_design_name(SystemClock.now_ms())));

	let refresh = move || {
		if !user.with_value(|u| can_use_store(u.as_ref())) {
			return;
		}
		spawn_local(async move {
			let gateway = gateway.get_value();
			let designs = gateway.list(user.get_value().as_ref()).await;
			saved.set(designs);
		})
	};
	refresh();

	let save = move |_| {
		spawn_local(async move {
			let gateway = gateway.get_value();
			let user = user.get_value();
			let (current, name, snapshot, generation) = designer.with_untracked(|d| {
				(
					d.current_design(),
					d.design_name().to_string(),
					d.snapshot(),
					d.generation(),
				)
			});
			loading.set(true);
			let ok = match current {
				Some(id) => gateway
					.update_existing(user.as_ref(), Some(id), &name, &snapshot)
					.await
					.is_ok(),
				None => match gateway
					.create_new(user.as_ref(), &name, &snapshot, &SystemClock)
					.await
				{
					Ok(id) => {
						designer.maybe_update(|d| d.mark_saved(id, name.trim(), generation));
						true
					}
					Err(_) => false,
				},
			};
			loading.set(false);
			if ok {
				refresh();
			}
		})
	};

	let load = move |id: DesignId| {
		spawn_local(async move {
			let gateway = gateway.get_value();
			loading.set(true);
			let result = gateway.load(user.get_value().as_ref(), id).await;
			loading.set(false);
			if let Ok(loaded) = result {
				designer.update(|d| d.apply_loaded(loaded));
				viewport.with_value(|vp| designer.with_untracked(|d| vp.fit_view(d.nodes())));
			}
		})
	};

	let delete = move |id: DesignId| {
		let gateway = gateway.get_value();
		if !gateway
			.notifier()
			.confirm("Are you sure you want to delete this design?")
		{
			return;
		}
		spawn_local(async move {
			if gateway.delete(user.get_value().as_ref(), id).await.is_ok() {
				designer.maybe_update(|d| d.forget_design(id));
				refresh();
			}
		})
	};

	let add_part = move |part_id: &'static str| {
		let vp = viewport.get_value();
		designer.maybe_update(|d| {
			d.add_part(part_id, Some(&vp), &mut rand::thread_rng(), &SystemClock)
				.is_some()
		});
	};

	let on_intent = Callback::new(move |intent: CanvasIntent| {
		designer.maybe_update(|d| d.handle(intent));
	});

	let palette = designer
		.with_untracked(|d| *d.catalog())
		.list_groups()
		.iter()
		.map(|group| {
			view! {
				<section class="palette-group">
					<h4>{group.name}</h4>
					<div class="parts-grid">
						{group.parts.iter().map(|part| view! { <PartButton part=part on_pick=add_part /> }).collect_view()}
					</div>
				</section>
			}
		})
		.collect_view();

	view! {
		<div class="station-designer">
			<header class="designer-header">
				<div class="header-left">
					<h2>"🚀 Space Station Designer"</h2>
					<h3 class="design-title">
						{move || designer.with(|d| match d.design_name().trim() {
							"" => "Untitled Design".to_string(),
							name => name.to_string(),
						})}
					</h3>
					<div class="design-info">
						<input
							class="design-name"
							placeholder="Untitled Design"
							prop:value=move || designer.with(|d| d.design_name().to_string())
							on:input=move |ev| designer.update(|d| d.set_design_name(event_target_value(&ev)))
						/>
						<span>{move || format!("Parts: {}", designer.with(|d| d.nodes().len()))}</span>
						<span>
							{move || {
								let budget = designer.with(|d| d.power_budget());
								format!(
									"Power: +{:.1} / -{:.1} kW (net {:+.1})",
									budget.generated_kw,
									budget.consumed_kw,
									budget.net_kw(),
								)
							}}
						</span>
						<span class="design-status">
							{move || match designer.with(|d| d.current_design()) {
								Some(id) => format!("Design #{id}"),
								None => "Unsaved".to_string(),
							}}
						</span>
					</div>
				</div>
				<div class="header-right">
					<button
						class="action-btn secondary"
						on:click=move |_| designer.update(|d| d.new_design(new_design_name(SystemClock.now_ms())))
					>
						"＋ New"
					</button>
					<button
						class="action-btn secondary"
						on:click=move |_| viewport.with_value(|vp| designer.with_untracked(|d| vp.fit_view(d.nodes())))
					>
						"⤢ Fit"
					</button>
					<button
						class="action-btn secondary"
						disabled=move || designer.with(|d| d.selection().is_idle())
						on:click=move |_| {
							designer.maybe_update(|d| d.delete_selected());
						}
					>
						"✂ Delete selected"
					</button>
					<button class="action-btn danger" on:click=move |_| designer.update(|d| d.clear())>
						"🗑️ Clear"
					</button>
					<button class="action-btn primary" disabled=move || loading.get() on:click=save>
						{move || if loading.get() { "⏳ Saving…" } else { "💾 Save Design" }}
					</button>
				</div>
			</header>

			<div class="designer-content">
				<aside class="parts-palette">
					<h3>"🛠️ Station Parts"</h3>
					{palette}
				</aside>

				<main class="design-canvas-wrap">
					<DesignCanvas
						designer=designer
						viewport=viewport.get_value()
						on_intent=on_intent
					/>
				</main>

				<aside class="saved-designs">
					<h3>"📂 Saved Designs"</h3>
					<Show when=move || saved.with(|s| s.is_empty())>
						<p class="empty">"No saved designs yet."</p>
					</Show>
					<ul>
						<For
							each=move || saved.get()
							key=|design| design.id
							children=move |design| {
								let id = design.id;
								view! {
									<li class="saved-design">
										<span class="name">{design.name.clone()}</span>
										<span class="count">{format!("{} parts", design.parts_count)}</span>
										<button class="action-btn small" on:click=move |_| load(id)>
											"Load"
										</button>
										<button class="action-btn small danger" on:click=move |_| delete(id)>
											"Delete"
										</button>
									</li>
								}
							}
						/>
					</ul>
				</aside>
			</div>
		</div>
	}
}

#[component]
fn PartButton<F>(part: &'static PartDefinition, on_pick: F) -> impl IntoView
where
	F: Fn(&'static str) + Copy + 'static,
{
	view! {
		<button
			class="part-item"
			title=part.description
			style=format!("border-color: {}", part.color)
			on:click=move |_| on_pick(part.id)
		>
			<span class="part-item-icon" style=format!("background-color: {}", part.color)>
				{part.icon}
			</span>
			<span class="part-item-name">{part.name}</span>
		</button>
	}
}
