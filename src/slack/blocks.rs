//! Slack Block Kit message builders.
//!
//! The status menu is rendered as a single actions block of buttons; each
//! button carries the menu choice in its `action_id`.

use slack_morphism::prelude::{
    SlackActionBlockElement, SlackActionsBlock, SlackBlock,
    SlackBlockButtonElement, SlackBlockId, SlackBlockPlainTextOnly, SlackBlockText,
    SlackSectionBlock,
};

use crate::transport::{Menu, MenuChoice, Outbound};

/// Block id of the status menu actions block.
pub const STATUS_MENU_BLOCK_ID: &str = "status_menu";

/// Build a plain text section block.
#[must_use]
pub fn text_section(text: &str) -> SlackBlock {
    SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(text.into())))
}

/// Build an actions block with the given `(action_id, text, value)` buttons.
#[must_use]
pub fn action_buttons(block_id: &str, buttons: &[(String, &str, &str)]) -> SlackBlock {
    let elements: Vec<SlackActionBlockElement> = buttons
        .iter()
        .map(|(action_id, text, value)| {
            SlackActionBlockElement::Button(
                SlackBlockButtonElement::new(
                    action_id.as_str().into(),
                    SlackBlockPlainTextOnly::from(*text),
                )
                .with_value((*value).into()),
            )
        })
        .collect();
    SlackBlock::Actions(
        SlackActionsBlock::new(elements).with_block_id(SlackBlockId(block_id.into())),
    )
}

/// Build the status menu: one button per status kind plus the roster query.
#[must_use]
pub fn status_menu() -> SlackBlock {
    let buttons: Vec<(String, &str, &str)> = MenuChoice::all()
        .into_iter()
        .map(|choice| {
            let value = match choice {
                MenuChoice::Status(kind) => kind.tag(),
                MenuChoice::Roster => "roster",
            };
            (choice.action_id(), choice.label(), value)
        })
        .collect();
    action_buttons(STATUS_MENU_BLOCK_ID, &buttons)
}

/// Blocks for an outbound message, or `None` when plain text suffices.
#[must_use]
pub fn outbound_blocks(message: &Outbound) -> Option<Vec<SlackBlock>> {
    message.menu.map(|menu| match menu {
        Menu::Status => vec![text_section(&message.text), status_menu()],
    })
}

/// Static replacement for a menu once a choice was made.
#[must_use]
pub fn choice_made_section(choice: MenuChoice) -> SlackBlock {
    text_section(&format!("\u{2714}\u{fe0f} {}", choice.label()))
}
