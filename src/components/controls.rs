use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlInputElement, Url};

/// Hands `text` to the browser as a JSON file download.
pub fn offer_download(file_name: &str, text: &str) -> Result<(), JsValue> {
	let parts = js_sys::Array::of1(&JsValue::from_str(text));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = document();
	let body = document
		.body()
		.ok_or_else(|| JsValue::from_str("document has no body"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	body.append_child(&anchor)?;
	anchor.click();
	body.remove_child(&anchor)?;
	// The download starts after this task yields; revoking now can cancel it.
	set_timeout(
		move || {
			if let Err(e) = Url::revoke_object_url(&url) {
				log::warn!("revoking download url failed: {e:?}");
			}
		},
		Duration::ZERO,
	);
	Ok(())
}

async fn read_selected_file(input: &HtmlInputElement) -> Result<Option<String>, JsValue> {
	let Some(file) = input.files().and_then(|files| files.get(0)) else {
		return Ok(None);
	};
	let text = JsFuture::from(file.text()).await?;
	Ok(text.as_string())
}

/// Export, import, clear and settings buttons, plus the last import notice.
#[component]
pub fn Controls(
	#[prop(into)] on_export: Callback<()>,
	#[prop(into)] on_import: Callback<String>,
	#[prop(into)] on_clear: Callback<()>,
	#[prop(into)] on_open_settings: Callback<()>,
	#[prop(into)] notice: Signal<Option<String>>,
) -> impl IntoView {
	let file_input = NodeRef::<leptos::html::Input>::new();

	let open_picker = move |_| {
		if let Some(input) = file_input.get() {
			input.click();
		}
	};

	let on_file_change = move |_| {
		let Some(input) = file_input.get() else {
			return;
		};
		let input: HtmlInputElement = input.into();
		spawn_local(async move {
			match read_selected_file(&input).await {
				Ok(Some(text)) => on_import.run(text),
				Ok(None) => {}
				Err(e) => log::error!("reading selected file failed: {e:?}"),
			}
			// let the same file be picked again
			input.set_value("");
		});
	};

	view! {
		<div class="save__controls">
			<button on:click=move |_| on_export.run(())>"export"</button>
			<button on:click=open_picker>"import"</button>
			<button on:click=move |_| on_clear.run(())>"clear"</button>
			<button on:click=move |_| on_open_settings.run(())>"settings"</button>
			<input
				node_ref=file_input
				type="file"
				accept="application/json,.json"
				style="display: none"
				on:change=on_file_change
			/>
			<Show when=move || notice.get().is_some()>
				<p class="notice">{move || notice.get().unwrap_or_default()}</p>
			</Show>
		</div>
	}
}
