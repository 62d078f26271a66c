use crate::catalog::Region;
use crate::state::RosterView;

/// Intimacy below which an animal is nudged for more interaction.
const LOW_INTIMACY: u8 = 3;

/// Next-step hints for the player, most important first.
#[must_use]
pub fn recommendations(roster: &impl RosterView, limit: usize) -> Vec<String> {
    let captured = roster.captured_animals();
    let mut hints = Vec::new();

    match captured.len() {
        0 => hints.push(
            "Start exploring New Zealand's North or South Island to discover your first animal!"
                .to_string(),
        ),
        1 => hints.push(
            "Keep exploring, there are more amazing animals waiting to be discovered!".to_string(),
        ),
        _ => {}
    }

    if let Some(shy) = captured
        .iter()
        .find(|record| record.intimacy() < LOW_INTIMACY)
    {
        hints.push(format!(
            "Spend more time with {} to grow your friendship and unlock more content!",
            shy.template().display_name
        ));
    }

    if let Some(threatened) = captured
        .iter()
        .find(|record| record.template().conservation.is_threatened())
    {
        hints.push(format!(
            "Learn why {} is {} and how you can help protect them!",
            threatened.template().display_name,
            threatened.template().conservation
        ));
    }

    let on = |region: Region| {
        captured
            .iter()
            .filter(|record| record.template().region.covers(region))
            .count()
    };
    let (north, south) = (on(Region::North), on(Region::South));
    if north > south {
        hints.push("Try exploring the South Island to discover different species!".to_string());
    } else if south > north {
        hints.push("The North Island still has animals waiting for you!".to_string());
    }

    hints.truncate(limit);
    hints
}
