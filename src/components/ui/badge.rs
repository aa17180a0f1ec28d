use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Badge, span, "inline-flex items-center rounded-md bg-secondary px-2 py-0.5 text-xs font-medium text-secondary-foreground"}
    clx! {BadgeList, p, "mb-1 flex flex-wrap gap-1"}
}

pub use components::*;
