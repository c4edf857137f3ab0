use iced::widget::{button, column, container, image, row, text};
use iced::{Alignment, ContentFit, Element, Length};

use crate::Message;

/// Live preview with Take Photo / Cancel
pub fn modal(preview: Option<&image::Handle>) -> Element<'_, Message> {
    let video: Element<'_, Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text("Starting camera..."))
            .height(360)
            .center_y(360)
            .into(),
    };

    let controls = row![
        button("Take Photo")
            .padding([8, 24])
            .on_press_maybe(preview.is_some().then_some(Message::TakePhoto)),
        button("Cancel")
            .padding([8, 24])
            .style(button::secondary)
            .on_press(Message::CancelWebcam),
    ]
    .spacing(16);

    container(
        column![text("Webcam Capture").size(20), video, controls]
            .spacing(16)
            .align_x(Alignment::Center),
    )
    .padding(16)
    .max_width(680)
    .style(container::rounded_box)
    .into()
}
