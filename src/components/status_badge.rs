use cosmic::widget::{button, text};
use cosmic::{Element, theme};

use crate::message::Message;

/// Render a small non-interactive label chip (e.g. "inactive").
pub fn status_badge(label: String) -> Element<'static, Message> {
    button::custom(text::caption(label).size(11.0))
        .padding([2, 8])
        .class(theme::Button::Text)
        .into()
}
