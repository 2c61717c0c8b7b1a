use crate::assets::TextureId;
use crate::geom::Rect;
use crate::model::{backdrop, bottom_bar, top_bar, Death, GameSession, Phase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DrawCall {
    pub(crate) texture: TextureId,
    pub(crate) rect: Rect,
}

impl DrawCall {
    fn new(texture: TextureId, rect: Rect) -> Self {
        Self { texture, rect }
    }
}

/// Back-to-front draw list for the current frame.
pub(crate) fn compose(s: &GameSession) -> Vec<DrawCall> {
    if let Phase::GameOver(_) = s.phase {
        return vec![DrawCall::new(TextureId::GameOver, backdrop())];
    }

    let mut draws = Vec::with_capacity(4 + s.trucks.len() + s.logs.len());
    draws.push(DrawCall::new(TextureId::Background, backdrop()));
    draws.push(DrawCall::new(TextureId::Bar, top_bar()));
    draws.push(DrawCall::new(TextureId::Bar, bottom_bar()));

    let player = DrawCall::new(TextureId::Player, s.player);
    if s.rules.player_under_obstacles {
        draws.push(player);
    }
    draws.extend(s.trucks.iter().map(|o| DrawCall::new(TextureId::Truck, o.rect)));
    draws.extend(s.logs.iter().map(|o| DrawCall::new(TextureId::Log, o.rect)));
    if !s.rules.player_under_obstacles {
        draws.push(player);
    }
    draws
}

pub(crate) fn hud_lines(s: &GameSession) -> [String; 2] {
    let status = match s.phase {
        Phase::Running => "",
        Phase::Paused => "  |  PAUSED",
        Phase::GameOver(Death::Hit) => "  |  SPLAT",
        Phase::GameOver(Death::Drowned) => "  |  DROWNED",
    };
    let line1 = format!("FROGGER  |  Level {}{}", s.level, status);

    let line2 = match s.phase {
        Phase::GameOver(_) => "GAME OVER  |  R restart   Q quit".to_string(),
        Phase::Paused => "P resume   Q quit".to_string(),
        Phase::Running if s.rules.pause_enabled => "Arrows/WASD move   P pause   Q quit".to_string(),
        Phase::Running => "Arrows/WASD move   Q quit".to_string(),
    };
    [line1, line2]
}
