use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::components::controls::{Controls, offer_download};
use crate::components::settings_modal::SettingsModal;
use crate::components::tree_canvas::TreeCanvas;
use crate::oracle::OpenAiOracle;
use crate::settings::{Session, UserSettings};
use crate::tree::{
	EXPORT_FILE_NAME, GraphStore, Position, Viewport, expand, export_document, import_document,
};

/// The tree editor: canvas, controls bar and settings modal.
///
/// Owns the graph store, viewport and session settings for the lifetime of
/// the page.
#[component]
pub fn Home() -> impl IntoView {
	let graph = RwSignal::new(GraphStore::default());
	let viewport = RwSignal::new(Viewport::default());
	let session = RwSignal::new(Session::default());
	let settings_visible = RwSignal::new(true);
	let notice = RwSignal::new(None::<String>);

	let on_node_activated = Callback::new(move |id: String| {
		let Some(session) = session.try_get_untracked() else {
			return;
		};
		if !session.user.has_api_key() {
			warn!("no API key set, label request will fail");
		}
		spawn_local(async move {
			let oracle = OpenAiOracle::new(session.oracle.clone());
			if let Some(count) = expand(&graph, &oracle, &session.user, &id).await {
				info!("{count} labels committed under {id}");
			}
		});
	});

	let on_node_moved = Callback::new(move |(id, position): (String, Position)| {
		graph.update(|g| {
			g.move_node(&id, position);
		});
	});

	let on_connect = Callback::new(move |(source, target): (String, String)| {
		graph.update(|g| {
			if g.connect(&source, &target).is_none() {
				warn!("edge {source} -> {target} rejected");
			}
		});
	});

	let on_node_edit = Callback::new(move |id: String| {
		let current = graph.with_untracked(|g| g.node(&id).map(|n| n.label().to_owned()));
		let Some(current) = current else {
			return;
		};
		let answer = window().prompt_with_message_and_default("Label", &current);
		if let Ok(Some(label)) = answer {
			let label = label.trim().to_owned();
			if !label.is_empty() {
				graph.update(|g| {
					g.replace_label(&id, label);
				});
			}
		}
	});

	let on_export = Callback::new(move |()| {
		let snapshot = graph.with_untracked(|g| g.snapshot(viewport.get_untracked()));
		let result = export_document(&snapshot)
			.map_err(|e| e.to_string())
			.and_then(|text| {
				offer_download(EXPORT_FILE_NAME, &text).map_err(|e| format!("{e:?}"))
			});
		if let Err(e) = result {
			log::error!("export failed: {e}");
		}
	});

	let on_import = Callback::new(move |text: String| {
		match graph.try_update(|g| import_document(g, &text)) {
			Some(Ok(restored)) => {
				if let Some(vp) = restored {
					viewport.set(vp);
				}
				notice.set(None);
			}
			Some(Err(e)) => notice.set(Some(format!("Import failed: {e}"))),
			None => {}
		}
	});

	let on_clear = Callback::new(move |()| {
		let root_label = session.with_untracked(|s| s.user.root_label.clone());
		graph.update(|g| g.reset(root_label.as_deref()));
	});

	let on_open_settings = Callback::new(move |()| settings_visible.set(true));

	let on_save_settings = Callback::new(move |user: UserSettings| {
		graph.update(|g| g.reset(user.root_label()));
		session.update(|s| s.user = user);
		settings_visible.set(false);
	});

	let on_node_removed = Callback::new(move |id: String| {
		graph.update(|g| {
			if g.remove_node(&id) {
				info!("removed node {id}");
			}
		});
	});

	let on_edge_removed = Callback::new(move |id: String| {
		graph.update(|g| {
			g.remove_edge(&id);
		});
	});

	let on_close_settings = Callback::new(move |()| settings_visible.set(false));

	view! {
		<div class="editor">
			<Show when=move || settings_visible.get()>
				<SettingsModal
					initial=session.with_untracked(|s| s.user.clone())
					on_save=on_save_settings
					on_close=on_close_settings
				/>
			</Show>
			<TreeCanvas
				graph=graph
				viewport=viewport
				on_node_activated=on_node_activated
				on_node_moved=on_node_moved
				on_connect=on_connect
				on_node_edit=on_node_edit
				on_node_removed=on_node_removed
				on_edge_removed=on_edge_removed
			/>
			<Controls
				on_export=on_export
				on_import=on_import
				on_clear=on_clear
				on_open_settings=on_open_settings
				notice=notice
			/>
		</div>
	}
}
