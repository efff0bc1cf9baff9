use leptos::prelude::*;

use crate::settings::UserSettings;

const API_KEYS_URL: &str = "https://platform.openai.com/account/api-keys";

/// Modal form for the API key and the root label.
#[component]
pub fn SettingsModal(
	initial: UserSettings,
	#[prop(into)] on_save: Callback<UserSettings>,
	#[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
	let api_key = RwSignal::new(initial.api_key);
	let root_label = RwSignal::new(initial.root_label.unwrap_or_default());

	let save = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		on_save.run(UserSettings::from_form(
			&api_key.get_untracked(),
			&root_label.get_untracked(),
		));
	};

	view! {
		<div class="settings-modal">
			<form class="settings-content" on:submit=save>
				<h3>"Settings"</h3>
				<label>
					<a target="_blank" rel="noopener noreferrer" href=API_KEYS_URL>
						"OPENAI API KEY:"
					</a>
					<input
						type="password"
						prop:value=move || api_key.get()
						on:input=move |ev| api_key.set(event_target_value(&ev))
					/>
				</label>
				<label>
					"Root role:"
					<input
						type="text"
						placeholder=crate::tree::DEFAULT_ROOT_LABEL
						prop:value=move || root_label.get()
						on:input=move |ev| root_label.set(event_target_value(&ev))
					/>
				</label>
				<div class="buttons">
					<button type="submit">"Save"</button>
					<button type="button" on:click=move |_| on_close.run(())>
						"Close"
					</button>
				</div>
			</form>
		</div>
	}
}
