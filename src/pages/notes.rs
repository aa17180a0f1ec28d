use super::tone_class;
use crate::api::{FirebaseAuth, FirestoreNotes, IdentityService};
use crate::app::AppContext;
use crate::components::ui::{
    Badge, BadgeList, Button, ButtonSize, ButtonVariant, Card, CardContent, CardFooter,
    CardHeader, CardTitle, Input, Label, Spinner, Textarea,
};
use crate::models::{Note, Theme, PALETTE};
use crate::state::{ListView, NotesController};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::Arc;

type PageController = NotesController<FirebaseAuth, FirestoreNotes>;

#[component]
pub fn NotesPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let controller: PageController = NotesController::new(
        ctx.identity.clone(),
        ctx.store.clone(),
        ctx.storage.clone(),
        ctx.platform.clone(),
    );

    let view_state = controller.view();

    // Identity changes drive the load/sign-out state machine.
    let subscription = {
        let listener = controller.clone();
        controller.identity().subscribe(Arc::new(move |session| {
            let controller = listener.clone();
            spawn_local(async move {
                controller.on_auth_state_changed(session).await;
            });
        }))
    };
    {
        let identity = controller.identity().clone();
        on_cleanup(move || identity.unsubscribe(subscription));
    }

    let on_save = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            spawn_local(async move {
                controller.save().await;
            });
        }
    };

    let on_clear = {
        let controller = controller.clone();
        move |_| controller.clear()
    };

    let on_logout = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            spawn_local(async move {
                controller.logout().await;
            });
        }
    };

    let on_theme = {
        let controller = controller.clone();
        move |ev: leptos::ev::Event| {
            let theme = if event_target_checked(&ev) {
                Theme::Dark
            } else {
                Theme::Light
            };
            controller.set_theme(theme);
        }
    };

    let on_title = {
        let controller = controller.clone();
        move |v: String| controller.set_title(v)
    };
    let on_content = {
        let controller = controller.clone();
        move |v: String| controller.set_content(v)
    };
    let on_tags = {
        let controller = controller.clone();
        move |v: String| controller.set_tags(v)
    };
    let on_search = {
        let controller = controller.clone();
        move |v: String| controller.search(&v)
    };

    let swatches = {
        let controller = controller.clone();
        PALETTE
            .iter()
            .map(|&color| {
                let controller = controller.clone();
                let selected = move || view_state.with(|s| s.form.color == color);
                view! {
                    <button
                        type="button"
                        class=move || {
                            if selected() {
                                "size-6 rounded-full border ring-2 ring-ring ring-offset-1"
                            } else {
                                "size-6 rounded-full border"
                            }
                        }
                        style=format!("background-color: {color}")
                        title=color
                        aria-pressed=move || selected().to_string()
                        on:click=move |_| controller.select_color(color)
                    ></button>
                }
            })
            .collect_view()
    };

    let list = move || {
        let state = view_state.get();
        match state.list_view() {
            ListView::Loading => view! {
                <div class="flex items-center gap-2 text-xs text-muted-foreground">
                    <Spinner />
                    "Loading..."
                </div>
            }
            .into_any(),
            ListView::Failed(message) => {
                view! { <p class="text-xs text-destructive">{message.to_string()}</p> }.into_any()
            }
            ListView::Empty => {
                view! { <p class="text-xs text-muted-foreground">"No notes found."</p> }.into_any()
            }
            ListView::Notes(notes) => {
                let controller = controller.clone();
                notes
                    .iter()
                    .cloned()
                    .map(|note| view! { <NoteCard note=note controller=controller.clone() /> })
                    .collect_view()
                    .into_any()
            }
        }
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-4xl px-4 py-6">
                <header class="mb-6 flex items-center justify-between gap-3">
                    <h1 class="text-base font-semibold text-foreground">"My Notes"</h1>
                    <div class="flex items-center gap-3">
                        <label class="flex items-center gap-1.5 text-xs text-muted-foreground">
                            <input
                                id="theme-toggle"
                                type="checkbox"
                                prop:checked=move || view_state.with(|s| s.theme == Theme::Dark)
                                on:change=on_theme
                            />
                            "Dark mode"
                        </label>
                        <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_logout>
                            "Logout"
                        </Button>
                    </div>
                </header>

                <Card class="mb-6">
                    <CardHeader>
                        <CardTitle class="text-sm">
                            {move || {
                                if view_state.with(|s| s.form.is_editing()) { "Edit note" } else { "New note" }
                            }}
                        </CardTitle>
                    </CardHeader>

                    <CardContent>
                        <div class="flex flex-col gap-3">
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="note-title" class="text-xs">"Title"</Label>
                                <Input
                                    id="note-title"
                                    placeholder="Title"
                                    value=Signal::derive(move || view_state.with(|s| s.form.title.clone()))
                                    on_value=on_title
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="note-content" class="text-xs">"Content"</Label>
                                <Textarea
                                    id="note-content"
                                    placeholder="Write something..."
                                    rows=5
                                    value=Signal::derive(move || view_state.with(|s| s.form.content.clone()))
                                    on_value=on_content
                                    class="text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="note-tags" class="text-xs">"Tags"</Label>
                                <Input
                                    id="note-tags"
                                    placeholder="work, ideas"
                                    value=Signal::derive(move || view_state.with(|s| s.form.tags.clone()))
                                    on_value=on_tags
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex items-center gap-2">
                                <span class="text-xs text-muted-foreground">"Color"</span>
                                {swatches}
                            </div>
                        </div>
                    </CardContent>

                    <CardFooter class="flex items-center gap-2">
                        <Button size=ButtonSize::Sm on:click=on_save>"Save"</Button>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_clear>
                            "Clear"
                        </Button>
                        {move || {
                            view_state.get().status.map(|m| {
                                view! { <span id="status" class=format!("text-xs {}", tone_class(m.tone))>{m.text}</span> }
                            })
                        }}
                    </CardFooter>
                </Card>

                <div class="mb-4">
                    <Input
                        id="search"
                        r#type="search"
                        placeholder="Search notes..."
                        value=Signal::derive(move || view_state.with(|s| s.query.clone()))
                        on_value=on_search
                        class="h-8 text-sm"
                    />
                </div>

                <div id="notes-list" class="grid gap-3 sm:grid-cols-2">{list}</div>
            </div>
        </div>
    }
}

#[component]
fn NoteCard(note: Note, controller: PageController) -> impl IntoView {
    let on_edit = {
        let controller = controller.clone();
        let note = note.clone();
        move |_| controller.edit(&note)
    };

    let on_delete = {
        let note = note.clone();
        move |_| {
            let controller = controller.clone();
            let note = note.clone();
            spawn_local(async move {
                controller.delete(&note).await;
            });
        }
    };

    let style = format!("background-color: {}", note.display_color());
    let title = note.display_title().to_string();
    let content = note.content.clone();
    let tag_list = note.tags.clone();
    let badges = (!tag_list.is_empty()).then(move || {
        let badges = tag_list
            .into_iter()
            .map(|tag| view! { <Badge>{tag}</Badge> })
            .collect_view();
        view! { <BadgeList class="mt-2">{badges}</BadgeList> }
    });

    view! {
        <Card class="text-zinc-900" attr:style=style>
            <CardHeader>
                <CardTitle class="text-sm">{title}</CardTitle>
            </CardHeader>
            <CardContent>
                <p class="whitespace-pre-wrap text-xs">{content}</p>
                {badges}
            </CardContent>
            <CardFooter class="flex gap-2">
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_edit>
                    "Edit"
                </Button>
                <Button variant=ButtonVariant::OutlineDestructive size=ButtonSize::Sm on:click=on_delete>
                    "Delete"
                </Button>
            </CardFooter>
        </Card>
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::config::FirebaseConfig;
    use crate::platform::BrowserPlatform;
    use crate::storage::BrowserStorage;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn page_controller() -> PageController {
        let config = Arc::new(FirebaseConfig::new("k", "p"));
        let identity = FirebaseAuth::new(config.clone(), Arc::new(BrowserStorage));
        let store = FirestoreNotes::new(config, identity.clone());
        NotesController::new(
            identity,
            store,
            Arc::new(BrowserStorage),
            Arc::new(BrowserPlatform),
        )
    }

    #[wasm_bindgen_test]
    fn test_note_card_renders_fields_badges_and_color() {
        let note = Note {
            id: "n1".to_string(),
            user_id: "u1".to_string(),
            title: String::new(),
            content: "Milk".to_string(),
            tags: vec!["food".to_string(), "home".to_string()],
            color: "#ffcc00".to_string(),
            created_at: None,
            updated_at: None,
        };
        let controller = page_controller();

        let document = web_sys::window().unwrap().document().unwrap();
        let host = document.create_element("div").unwrap();
        document.body().unwrap().append_child(&host).unwrap();

        let handle = leptos::mount::mount_to(host.clone().unchecked_into(), move || {
            view! { <NoteCard note=note controller=controller /> }
        });

        let text = host.text_content().unwrap_or_default();
        assert!(text.contains("(No title)"));
        assert!(text.contains("Milk"));
        assert!(text.contains("food"));
        assert!(text.contains("home"));
        assert!(host.inner_html().contains("background-color: #ffcc00"));

        drop(handle);
        host.remove();
    }
}
