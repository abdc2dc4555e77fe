//! Terminal renderer. Nothing outside this file writes to the screen.
//!
//! Each function receives a mutable writer and an immutable view of the
//! world and HUD. No game logic is performed; world units are mapped onto
//! terminal cells through a [`Viewport`] rebuilt every frame.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use invaders::entities::{EnemyTier, GameState, ProjectileOwner, Vec2};
use invaders::hud::Hud;
use invaders::world::World;

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_LEVEL: Color = Color::Yellow;
const C_HUD_HEARTS: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_ENEMY_RED: Color = Color::Red;
const C_ENEMY_YELLOW: Color = Color::Yellow;
const C_ENEMY_GREEN: Color = Color::Green;
const C_OBSTACLE: Color = Color::DarkGreen;
const C_SHOT_PLAYER: Color = Color::Cyan;
const C_SHOT_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Maps the play field onto the area inside the border
/// (columns 1..width-1, rows 2..height-2).
struct Viewport {
    width: u16,
    height: u16,
    extent_x: f32,
    top: f32,
    bottom: f32,
}

impl Viewport {
    fn new(world: &World, width: u16, height: u16) -> Self {
        let field = &world.config.field;
        Viewport {
            width,
            height,
            // A little slack so enemies touching the wall stay visible.
            extent_x: field.half_width + 0.5,
            top: field.top,
            bottom: field.bottom,
        }
    }

    fn cols(&self) -> f32 {
        self.width.saturating_sub(3) as f32
    }

    fn rows(&self) -> f32 {
        self.height.saturating_sub(5) as f32
    }

    fn to_cell(&self, p: Vec2) -> Option<(u16, u16)> {
        let fx = (p.x + self.extent_x) / (2.0 * self.extent_x);
        let fy = (self.top - p.y) / (self.top - self.bottom);
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        let col = 1 + (fx * self.cols()).round() as u16;
        let row = 2 + (fy * self.rows()).round() as u16;
        Some((col, row))
    }
}

/// Draw a full frame of the world and HUD.
pub fn render<W: Write>(
    out: &mut W,
    world: &World,
    hud: &Hud,
    muted: bool,
) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport::new(world, width, height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_hud(out, &view, hud, muted)?;

    for part in world.obstacles.parts().iter().filter(|p| p.alive) {
        if let Some((col, row)) = view.to_cell(part.position) {
            put(out, col, row, C_OBSTACLE, "█")?;
        }
    }

    for enemy in world.formation.enemies().iter().filter(|e| !e.is_dead()) {
        draw_enemy(out, &view, enemy.position, enemy.tier)?;
    }

    for projectile in world.projectiles.active() {
        draw_projectile(out, &view, projectile.position, projectile.owner)?;
    }

    if world.player.is_active() {
        draw_player(out, &view, world.player.position())?;
    }

    draw_overlay(out, &view, world.session.state, hud)?;
    draw_controls_hint(out, &view)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Coloured text at a terminal cell.
fn put<W: Write>(out: &mut W, col: u16, row: u16, color: Color, text: &str) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

/// Frame around the play field, between the HUD row and the hint row.
fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let inner = "─".repeat(view.width.saturating_sub(2) as usize);
    let top = 1;
    let bottom = view.height.saturating_sub(2);
    let right = view.width.saturating_sub(1);

    put(out, 0, top, C_BORDER, &format!("┌{inner}┐"))?;
    put(out, 0, bottom, C_BORDER, &format!("└{inner}┘"))?;
    for row in top + 1..bottom {
        put(out, 0, row, C_BORDER, "│")?;
        put(out, right, row, C_BORDER, "│")?;
    }
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, view: &Viewport, hud: &Hud, muted: bool) -> std::io::Result<()> {
    let stats = format!("Level {:>2}   Kills {:>4}", hud.level, hud.kills);
    put(out, 1, 0, C_HUD_LEVEL, &stats)?;

    if muted {
        let tag = "[MUTED]";
        put(out, centered(view.width, tag), 0, C_HINT, tag)?;
    }

    // Hidden between waves.
    if let Some(hearts) = hud.hearts {
        let hearts = "♥".repeat(hearts.max(0) as usize);
        let col = view.width.saturating_sub(hearts.chars().count() as u16 + 1);
        put(out, col, 0, C_HUD_HEARTS, &hearts)?;
    }
    Ok(())
}

/// Column that centres `text` on a line `width` cells wide.
fn centered(width: u16, text: &str) -> u16 {
    (width / 2).saturating_sub(text.chars().count() as u16 / 2)
}

fn draw_player<W: Write>(out: &mut W, view: &Viewport, position: Vec2) -> std::io::Result<()> {
    match view.to_cell(position) {
        Some((col, row)) => put(out, sprite_col(col), row, C_PLAYER, "/▲\\"),
        None => Ok(()),
    }
}

fn draw_enemy<W: Write>(
    out: &mut W,
    view: &Viewport,
    position: Vec2,
    tier: EnemyTier,
) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(position) else {
        return Ok(());
    };
    let (sprite, color) = match tier {
        EnemyTier::Red => ("«▼»", C_ENEMY_RED),
        EnemyTier::Yellow => ("(◎)", C_ENEMY_YELLOW),
        EnemyTier::Green => ("╰▀╯", C_ENEMY_GREEN),
    };
    put(out, sprite_col(col), row, color, sprite)
}

fn draw_projectile<W: Write>(
    out: &mut W,
    view: &Viewport,
    position: Vec2,
    owner: ProjectileOwner,
) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(position) else {
        return Ok(());
    };
    let (glyph, color) = match owner {
        ProjectileOwner::Player => ("║", C_SHOT_PLAYER),
        ProjectileOwner::Enemy => ("↓", C_SHOT_ENEMY),
    };
    put(out, col, row, color, glyph)
}

/// Three-cell sprites are drawn around their centre cell, never over the wall.
fn sprite_col(col: u16) -> u16 {
    col.saturating_sub(1).max(1)
}

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    put(
        out,
        1,
        view.height.saturating_sub(1),
        C_HINT,
        "← → / A D : Move   SPACE : Shoot   ENTER : Start   M : Mute   Q : Quit",
    )
}

fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let first = (view.height / 2).saturating_sub(lines.len() as u16 / 2);
    for (row, (text, color)) in (first..).zip(lines) {
        put(out, centered(view.width, text), row, *color, text)?;
    }
    Ok(())
}

fn draw_overlay<W: Write>(
    out: &mut W,
    view: &Viewport,
    state: GameState,
    hud: &Hud,
) -> std::io::Result<()> {
    let mut lines: Vec<(String, Color)> = Vec::new();

    if hud.title_visible && state == GameState::Idle {
        lines.push(("★  SPACE  INVADERS  ★".to_string(), Color::Cyan));
        lines.push((String::new(), Color::Reset));
        lines.push(("ENTER : Start   Q : Quit".to_string(), Color::White));
    }

    if let Some(banner) = &hud.level_banner {
        lines.push((banner.clone(), Color::Yellow));
        if let Some(count) = hud.countdown {
            lines.push((count.to_string(), Color::White));
        }
    }

    if hud.victory_visible {
        lines.push(("╔════════════════════╗".to_string(), Color::Green));
        lines.push(("║      VICTORY!      ║".to_string(), Color::Green));
        lines.push(("╚════════════════════╝".to_string(), Color::Green));
    }
    if hud.defeat_visible {
        lines.push(("╔════════════════════╗".to_string(), Color::Red));
        lines.push(("║    GAME  OVER      ║".to_string(), Color::Red));
        lines.push(("╚════════════════════╝".to_string(), Color::Red));
    }
    if hud.restart_prompt_visible() {
        lines.push(("ENTER - Play Again  Q - Quit".to_string(), Color::White));
    }

    if lines.is_empty() {
        return Ok(());
    }
    draw_centered(out, view, &lines)
}
