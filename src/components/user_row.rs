use cosmic::iced::{Alignment, Length};
use cosmic::widget::{button, column, row, text};
use cosmic::Element;

use crate::components::status_badge::status_badge;
use crate::core::user::User;
use crate::fl;
use crate::message::Message;

/// One entry in the users list: name, email, and a details button.
pub fn user_row<'a>(user: &User, selected: bool) -> Element<'a, Message> {
    let info = column()
        .spacing(2)
        .push(text::title4(user.username.clone()))
        .push(text::caption(user.email.clone()));

    let mut line = row()
        .spacing(8)
        .align_y(Alignment::Center)
        .push(info.width(Length::Fill));

    if !user.active {
        line = line.push(status_badge(fl!("users-inactive")));
    }

    let details = if selected {
        button::suggested(fl!("users-details"))
    } else {
        button::standard(fl!("users-details"))
    };
    line = line.push(details.on_press(Message::InspectUser(user.id.clone())));

    line.into()
}
