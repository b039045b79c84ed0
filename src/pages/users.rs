use cosmic::iced::{Alignment, Length};
use cosmic::widget::{button, column, container, icon, row, scrollable, text, text_input};
use cosmic::Element;

use crate::components::user_row::user_row;
use crate::core::draft::DraftField;
use crate::core::roster::RosterState;
use crate::fl;
use crate::message::Message;

pub fn users_view<'a>(
    state: &'a RosterState,
    configured: bool,
    feedback: Option<&'a Result<String, String>>,
) -> Element<'a, Message> {
    let submitting = state.is_submitting();
    let draft = state.draft();

    let mut content = column().spacing(12);
    content = content.push(text::title3(fl!("users-title")));

    // Add-user form; inputs are read-only while a submission is in flight
    let mut username = text_input::text_input(fl!("form-username"), draft.get(DraftField::Username))
        .width(Length::Fill);
    let mut email = text_input::text_input(fl!("form-email"), draft.get(DraftField::Email))
        .width(Length::Fill);
    let mut submit = if submitting {
        button::suggested(fl!("form-submitting"))
    } else {
        button::suggested(fl!("form-submit"))
    }
    .width(Length::Fill);

    if !submitting {
        username = username
            .on_input(Message::UsernameChanged)
            .on_submit(|_| Message::Submit);
        email = email
            .on_input(Message::EmailChanged)
            .on_submit(|_| Message::Submit);
        submit = submit.on_press(Message::Submit);
    }

    content = content.push(username).push(email).push(submit);

    if let Some(result) = feedback {
        let label = match result {
            Ok(msg) => format!("✓ {}", msg),
            Err(e) => format!("✗ {}", e),
        };
        content = content.push(
            row()
                .spacing(8)
                .align_y(Alignment::Center)
                .push(text::body(label).width(Length::Fill))
                .push(
                    button::icon(icon::from_name("window-close-symbolic"))
                        .on_press(Message::DismissFeedback),
                ),
        );
    }

    let snapshot = state.snapshot();
    if !configured {
        content = content.push(
            container(text::body(fl!("users-not-configured")))
                .padding(32)
                .center_x(Length::Fill),
        );
    } else if snapshot.is_empty() {
        let placeholder = if state.is_fetching() {
            fl!("users-loading")
        } else {
            fl!("users-empty")
        };
        content = content.push(
            container(text::body(placeholder))
                .padding(32)
                .center_x(Length::Fill),
        );
    } else {
        let selected = state.selected().map(|u| &u.id);
        for user in snapshot {
            content = content.push(user_row(user, selected == Some(&user.id)));
        }
    }

    container(scrollable(content.padding(16).width(Length::Fill)))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Details of the selected user, shown in the context drawer.
pub fn inspector_view(state: &RosterState) -> column::Column<'_, Message> {
    let mut content = column().spacing(8);

    if state.inspecting().is_some() {
        content = content.push(text::caption(fl!("inspector-loading")));
    }

    let Some(user) = state.selected() else {
        return content;
    };

    let field = |label: String, value: String| {
        column()
            .spacing(2)
            .push(text::caption(label))
            .push(text::body(value))
    };

    content = content
        .push(field(fl!("inspector-id"), user.id.to_string()))
        .push(field(fl!("inspector-username"), user.username.clone()))
        .push(field(fl!("inspector-email"), user.email.clone()));

    let active = if user.active {
        fl!("inspector-yes")
    } else {
        fl!("inspector-no")
    };
    content.push(field(fl!("inspector-active"), active))
}
