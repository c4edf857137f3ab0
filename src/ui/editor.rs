/// Editor screen: original vs. generated, prompt, download / start over
use iced::widget::{button, column, container, image, row, text, text_input};
use iced::{Alignment, Element, Length};

use super::panel::image_panel;
use crate::state::instruction::PRESET_PROMPTS;
use crate::state::session::Session;
use crate::Message;

pub fn view<'a>(
    session: &'a Session,
    original: Option<&image::Handle>,
    edited: Option<&image::Handle>,
    prompt: &'a str,
) -> Element<'a, Message> {
    let loading = session.loading();
    let busy = loading.active;

    let panels = row![
        image_panel("Original", original, None),
        image_panel("AI Generated", edited, Some(loading)),
    ]
    .spacing(32);

    let customize = container(
        column![
            text("Customize Your Photo").size(22),
            text("Use text prompts to change the background, expression, and more.").size(14),
            prompt_input(prompt, busy),
        ]
        .spacing(12)
        .align_x(Alignment::Center),
    )
    .padding(20)
    .width(Length::Fill)
    .style(container::rounded_box);

    let can_download = session.edited().is_some() && !busy;
    let actions = row![
        button(text("⬇ Download Photo"))
            .padding([12, 28])
            .style(button::success)
            .on_press_maybe(can_download.then_some(Message::Download)),
        button(text("↺ Start Over"))
            .padding([12, 28])
            .style(button::secondary)
            .on_press(Message::StartOver),
    ]
    .spacing(16);

    column![panels, customize, actions]
        .spacing(28)
        .align_x(Alignment::Center)
        .into()
}

/// Free-text prompt plus the preset buttons; inert while a request runs
fn prompt_input(value: &str, busy: bool) -> Element<'_, Message> {
    let mut input = text_input("e.g., 'Change background to sky blue'", value).padding(10);
    if !busy {
        input = input
            .on_input(Message::PromptChanged)
            .on_submit(Message::SubmitPrompt);
    }

    let can_apply = !busy && !value.trim().is_empty();
    let form = row![
        input,
        button("Apply")
            .padding([10, 24])
            .on_press_maybe(can_apply.then_some(Message::SubmitPrompt)),
    ]
    .spacing(8);

    let presets = row(PRESET_PROMPTS.into_iter().map(|preset| {
        button(text(preset).size(13))
            .padding([4, 12])
            .style(button::secondary)
            .on_press_maybe((!busy).then_some(Message::SubmitPreset(preset)))
            .into()
    }))
    .spacing(8)
    .wrap();

    column![form, presets].spacing(10).into()
}
