use super::tone_class;
use crate::app::AppContext;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label,
};
use crate::state::AuthController;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn AuthPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let controller = AuthController::new(ctx.identity.clone(), ctx.platform.clone());

    let view_state = controller.view();

    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());

    let on_sign_in = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            let (email_val, password_val) = (email.get_untracked(), password.get_untracked());
            spawn_local(async move {
                controller.sign_in(&email_val, &password_val).await;
            });
        }
    };

    let on_sign_up = move |_| {
        let controller = controller.clone();
        let (email_val, password_val) = (email.get_untracked(), password.get_untracked());
        spawn_local(async move {
            controller.sign_up(&email_val, &password_val).await;
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <span class="text-sm font-medium text-foreground">"Cloud Notes"</span>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Welcome"</CardTitle>
                        <CardDescription class="text-xs">"Sign in, or create an account with your email."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <div class="flex flex-col gap-3">
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    value=email
                                    on_value=move |v: String| email.set(v)
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    value=password
                                    on_value=move |v: String| password.set(v)
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex gap-2">
                                <Button class="flex-1" size=ButtonSize::Sm on:click=on_sign_in>
                                    "Sign in"
                                </Button>
                                <Button
                                    class="flex-1"
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=on_sign_up
                                >
                                    "Sign up"
                                </Button>
                            </div>

                            {move || {
                                view_state.get().message.map(|m| {
                                    view! {
                                        <Alert class="px-3 py-2">
                                            <AlertDescription class=format!("text-xs {}", tone_class(m.tone))>
                                                {m.text}
                                            </AlertDescription>
                                        </Alert>
                                    }
                                })
                            }}
                        </div>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}
