use iced::widget::{column, container, image, stack, text};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};

use crate::state::data::LoadingState;
use crate::Message;

/// Panel size, fixed at 3:4 like the generated photos
const PANEL_WIDTH: f32 = 330.0;
const PANEL_HEIGHT: f32 = 440.0;

/// A titled 3:4 image slot with an optional loading overlay
pub fn image_panel<'a>(
    title: &'a str,
    handle: Option<&image::Handle>,
    loading: Option<&'a LoadingState>,
) -> Element<'a, Message> {
    let content: Element<'a, Message> = match handle {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Cover)
            .into(),
        None => text("Preview").size(16).into(),
    };

    let mut slot = stack![container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(container::rounded_box)];

    if let Some(loading) = loading.filter(|l| l.active) {
        slot = slot.push(loading_overlay(&loading.message));
    }

    column![
        text(title).size(18),
        container(slot).width(PANEL_WIDTH).height(PANEL_HEIGHT),
    ]
    .spacing(8)
    .align_x(Alignment::Center)
    .into()
}

fn loading_overlay(message: &str) -> Element<'_, Message> {
    container(
        column![text("⏳").size(32), text(message).size(16)]
            .spacing(12)
            .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .padding(16)
    .style(|_theme: &Theme| container::Style {
        background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
        text_color: Some(Color::WHITE),
        ..container::Style::default()
    })
    .into()
}
