use cosmic::iced::{Alignment, Length};
use cosmic::widget::{button, column, container, row, scrollable, text, text_input};
use cosmic::Element;

use crate::config::RosterConfig;
use crate::fl;
use crate::message::Message;

pub fn settings_view<'a>(
    config: &'a RosterConfig,
    timeout_input: &'a str,
    service_test_status: &Option<Result<String, String>>,
) -> Element<'a, Message> {
    let mut content = column().spacing(12);

    // --- Users service ---
    content = content.push(text::title4(fl!("settings-service")));
    content = content.push(text::body(fl!("settings-service-url")));
    content = content.push(
        text_input::text_input("http://localhost:5001", config.service_url.as_str())
            .on_input(Message::SetServiceUrl)
            .width(Length::Fill),
    );
    content = content.push(text::body(fl!("settings-request-timeout")));
    content = content.push(
        text_input::text_input("10", timeout_input)
            .on_input(Message::SetRequestTimeout)
            .width(Length::Fill),
    );

    {
        let mut test_row = row().spacing(8).align_y(Alignment::Center);
        test_row = test_row.push(
            button::standard(fl!("settings-test-connection"))
                .on_press(Message::TestServiceConnection),
        );
        if let Some(result) = service_test_status {
            match result {
                Ok(msg) => test_row = test_row.push(text::body(format!("✓ {}", msg))),
                Err(e) => test_row = test_row.push(text::body(format!("✗ {}", e))),
            }
        }
        content = content.push(test_row);
    }

    // --- Debug logging ---
    content = content.push(
        row()
            .spacing(8)
            .align_y(Alignment::Center)
            .push(text::body(fl!("settings-debug-logging")).width(Length::Fill))
            .push(
                cosmic::widget::toggler(config.debug_logging)
                    .on_toggle(|_| Message::ToggleDebugLogging),
            ),
    );

    container(scrollable(content.padding(16).width(Length::Fill)))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
