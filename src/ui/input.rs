use iced::widget::{button, column, container, horizontal_rule, row, text};
use iced::{Alignment, Element, Length};

use crate::capture::file::SIZE_HINT;
use crate::Message;

/// Landing screen: upload a file or use the webcam
pub fn view<'a>() -> Element<'a, Message> {
    let upload = button(
        column![
            text("⬆").size(48),
            text("Click to upload a file").size(20),
            text(SIZE_HINT).size(14),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .padding(40)
    .style(button::secondary)
    .on_press(Message::PickFile);

    let divider = row![horizontal_rule(1), text("OR").size(14), horizontal_rule(1)]
        .spacing(16)
        .align_y(Alignment::Center);

    let webcam = button(text("📷 Use Webcam").size(16))
        .width(Length::Fill)
        .padding(14)
        .style(button::secondary)
        .on_press(Message::StartWebcam);

    let card = container(column![upload, divider, webcam].spacing(24))
        .padding(32)
        .style(container::rounded_box);

    column![
        text("Create Your Perfect ID Photo").size(32),
        text("Upload a photo or use your webcam to get started.").size(16),
        card,
    ]
    .spacing(16)
    .max_width(640)
    .align_x(Alignment::Center)
    .into()
}
