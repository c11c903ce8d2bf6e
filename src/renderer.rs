use glam::Vec2;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Gauge, Paragraph,
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle},
    },
};

use crate::app::Phase;
use crate::arena::{Arena, SimState};
use crate::entities::{EntityRef, ORBITAL_RADIUS, Ship, xp_threshold};
use crate::upgrades::{Rarity, Upgrade};

/// Ships shown on the leaderboard
const LEADERBOARD_SIZE: usize = 5;
const ORB_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

/// View struct that holds all game state needed for rendering
pub struct RenderView<'a> {
    pub phase: Phase,
    pub arena: &'a Arena,
    pub area: Rect,
    pub fps: u32,
    pub elapsed_time_secs: u64,
}

/// Where each part of the screen goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub hud: Rect,
    pub xp_bar: Rect,
    pub world: Rect,
    pub leaderboard: Rect,
    pub minimap: Rect,
    pub controls: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect, minimap_size: u16) -> Self {
        let [hud, xp_bar, body, controls] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        // Terminal cells are about twice as tall as wide
        let side_width = (minimap_size * 2 + 2).max(24);
        let [world, side] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(side_width)]).areas(body);
        let [leaderboard, minimap, _] = Layout::vertical([
            Constraint::Length(LEADERBOARD_SIZE as u16 + 2),
            Constraint::Length(minimap_size + 2),
            Constraint::Min(0),
        ])
        .areas(side);

        Self {
            hud,
            xp_bar,
            world,
            leaderboard,
            minimap,
            controls,
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::Gray,
        Rarity::Rare => Color::Cyan,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => Color::Yellow,
    }
}

/// Canvas y grows upward, world y grows downward
fn plot(p: Vec2) -> (f64, f64) {
    (p.x as f64, -p.y as f64)
}

/// A `width` x `height` rectangle centred in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Handles all rendering responsibilities for the game
#[derive(Default)]
pub struct GameRenderer {}

impl GameRenderer {
    /// Creates a new GameRenderer
    pub fn new() -> Self {
        Self {}
    }

    /// Main render method that dispatches to phase-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.phase {
            Phase::Playing => self.render_game(frame, view),
            Phase::Paused => self.render_paused(frame, view),
            Phase::ChoosingUpgrade => self.render_upgrade_choice(frame, view),
            Phase::GameOver => self.render_game_over(frame, view),
        }
    }

    /// Renders the active gameplay screen
    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let arena = view.arena;
        let layout = ScreenLayout::new(view.area, arena.config().render.minimap_size);

        self.render_hud(frame, view, &layout);
        self.render_world(frame, arena, layout.world);
        self.render_leaderboard(frame, arena, layout.leaderboard);
        self.render_minimap(frame, arena, layout.minimap);

        let controls = Line::from(vec![Span::styled(
            "[WASD/Arrows: Move] [Mouse: Aim] [Click/Space: Fire] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);
        frame.render_widget(Paragraph::new(controls).centered(), layout.controls);
    }

    fn render_hud(&self, frame: &mut Frame, view: &RenderView, layout: &ScreenLayout) {
        let player = view.arena.player();
        let hp_ratio = if player.max_hp > 0.0 {
            player.hp / player.max_hp
        } else {
            0.0
        };
        let hp_style = if hp_ratio > 0.5 {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if hp_ratio > 0.25 {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        };
        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

        let minutes = view.elapsed_time_secs / 60;
        let seconds = view.elapsed_time_secs % 60;
        let stats = Line::from(vec![
            Span::styled(
                format!(" {} ", player.name),
                Style::default().fg(rgb(player.color)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("[Lv {}]", player.level), Style::default().fg(Color::Yellow).bold()),
            Span::styled("  Score: ", label),
            Span::styled(format!("{}", player.score), Style::default().fg(Color::Yellow).bold()),
            Span::styled("  Kills: ", label),
            Span::styled(format!("{}", player.kills), value),
            Span::styled("  HP: ", label),
            Span::styled(format!("{:.0}/{:.0}", player.hp.ceil(), player.max_hp), hp_style),
            Span::styled("  Time: ", label),
            Span::styled(format!("{:02}:{:02}", minutes, seconds), value),
            Span::styled("  FPS: ", label),
            Span::styled(format!("{}", view.fps), value),
        ]);
        frame.render_widget(Paragraph::new(stats), layout.hud);

        let xp = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
            .ratio(player.xp_progress())
            .label(format!("XP {}/{}", player.xp, xp_threshold(player.level)));
        frame.render_widget(xp, layout.xp_bar);
    }

    fn render_world(&self, frame: &mut Frame, arena: &Arena, area: Rect) {
        let camera = arena.camera();
        let view = arena.view_size();
        let world_size = arena.config().world.size;
        let spacing = arena.config().world.grid_spacing;

        let canvas = Canvas::default()
            .background_color(Color::Black)
            .marker(Marker::Braille)
            .x_bounds([camera.x as f64, (camera.x + view.x) as f64])
            .y_bounds([-(camera.y + view.y) as f64, -camera.y as f64])
            .paint(|ctx| {
                draw_grid(ctx, camera, view, world_size, spacing);
                ctx.draw(&Rectangle {
                    x: 0.0,
                    y: -world_size as f64,
                    width: world_size as f64,
                    height: world_size as f64,
                    color: Color::Red,
                });
                ctx.layer();

                let frame_no = arena.frame();
                for entity in arena.draw_order() {
                    let body = entity.body();
                    // Skip anything well outside the view
                    let margin = body.radius.max(100.0);
                    if body.pos.x < camera.x - margin
                        || body.pos.y < camera.y - margin
                        || body.pos.x > camera.x + view.x + margin
                        || body.pos.y > camera.y + view.y + margin
                    {
                        continue;
                    }

                    match entity {
                        EntityRef::Orb(orb) => {
                            let (x, y) = plot(orb.body.pos + Vec2::new(0.0, orb.phase.sin() * 3.0));
                            let color = ORB_COLORS[(frame_no / 6) as usize % ORB_COLORS.len()];
                            ctx.draw(&Circle {
                                x,
                                y,
                                radius: orb.body.radius as f64,
                                color,
                            });
                        }
                        EntityRef::Asteroid(asteroid) => {
                            let outline: Vec<(f64, f64)> = asteroid.world_outline().map(plot).collect();
                            for (i, &(x1, y1)) in outline.iter().enumerate() {
                                let (x2, y2) = outline[(i + 1) % outline.len()];
                                ctx.draw(&CanvasLine {
                                    x1,
                                    y1,
                                    x2,
                                    y2,
                                    color: Color::Gray,
                                });
                            }
                        }
                        EntityRef::Bullet(bullet) => {
                            let (x, y) = plot(bullet.body.pos);
                            ctx.draw(&Points {
                                coords: &[(x, y)],
                                color: rgb(bullet.color),
                            });
                        }
                        EntityRef::Ship(ship) => {
                            let labelled =
                                ship.is_player || ship.body.distance_to(arena.player().body.pos) < view.x / 2.0;
                            draw_ship(ctx, ship, frame_no, labelled);
                        }
                    }
                }
            });
        frame.render_widget(canvas, area);
    }

    fn render_leaderboard(&self, frame: &mut Frame, arena: &Arena, area: Rect) {
        let lines: Vec<Line> = arena
            .leaderboard(LEADERBOARD_SIZE)
            .into_iter()
            .enumerate()
            .map(|(rank, entry)| {
                let style = if entry.is_player {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(format!("{}. {:<12}", rank + 1, entry.name), style),
                    Span::styled(format!("{:>6}", entry.score), Style::default().fg(Color::Yellow)),
                ])
            })
            .collect();

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .title("Leaderboard")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            area,
        );
    }

    fn render_minimap(&self, frame: &mut Frame, arena: &Arena, area: Rect) {
        let size = arena.config().world.size as f64;
        let camera = arena.camera();
        let view = arena.view_size();

        let minimap = Canvas::default()
            .block(
                Block::default()
                    .title("Map")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .marker(Marker::Dot)
            .x_bounds([0.0, size])
            .y_bounds([-size, 0.0])
            .paint(|ctx| {
                let bots: Vec<(f64, f64)> = arena.bots().iter().map(|b| plot(b.body.pos)).collect();
                ctx.draw(&Points {
                    coords: &bots,
                    color: Color::Rgb(0xff, 0x00, 0x55),
                });
                ctx.draw(&Rectangle {
                    x: camera.x as f64,
                    y: -(camera.y + view.y) as f64,
                    width: view.x as f64,
                    height: view.y as f64,
                    color: Color::White,
                });
                ctx.layer();
                if arena.player().is_alive() {
                    ctx.draw(&Points {
                        coords: &[plot(arena.player().body.pos)],
                        color: Color::Rgb(0x00, 0xf2, 0xff),
                    });
                }
            });
        frame.render_widget(minimap, area);
    }

    /// Renders the pause screen with overlay
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let pause_area = centered(view.area, 30, 6);
        frame.render_widget(Clear, pause_area);
        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }

    /// Renders the level-up modal with one card per offered upgrade
    fn render_upgrade_choice(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let SimState::AwaitingUpgradeChoice { offers, queued } = view.arena.state() else {
            return;
        };

        let modal = centered(view.area, 78, 12);
        frame.render_widget(Clear, modal);
        let mut title = format!(" LEVEL UP! Level {} ", view.arena.player().level);
        if *queued > 0 {
            title.push_str(&format!("(+{queued} more) "));
        }
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let [cards_area, hint_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
        let cards = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(cards_area);
        for (i, (upgrade, card)) in offers.iter().zip(cards.iter()).enumerate() {
            render_card(frame, *card, i, upgrade);
        }

        frame.render_widget(
            Paragraph::new("Press 1, 2 or 3 to choose")
                .centered()
                .style(Style::default().fg(Color::DarkGray)),
            hint_area,
        );
    }

    /// Renders the game over screen
    fn render_game_over(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let player = view.arena.player();
        let minutes = view.elapsed_time_secs / 60;
        let seconds = view.elapsed_time_secs % 60;

        let game_over_text = vec![
            Line::from(""),
            Line::from("╔═══════════════════════════╗").centered().red(),
            Line::from("║        YOU DIED           ║")
                .centered()
                .red()
                .bold(),
            Line::from("╚═══════════════════════════╝").centered().red(),
            Line::from(""),
            Line::from(format!("Final Score: {}", player.score))
                .centered()
                .yellow()
                .bold(),
            Line::from(format!("Kills: {}   Level: {}", player.kills, player.level))
                .centered()
                .cyan()
                .bold(),
            Line::from(format!("Time Survived: {:02}:{:02}", minutes, seconds))
                .centered()
                .cyan(),
            Line::from(""),
            Line::from("Press R to restart").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];

        frame.render_widget(
            Paragraph::new(game_over_text)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }
}

fn draw_grid(ctx: &mut Context, camera: Vec2, view: Vec2, world_size: f32, spacing: f32) {
    if spacing <= 0.0 {
        return;
    }
    let color = Color::Rgb(0x1a, 0x1b, 0x26);
    let top = -camera.y.max(0.0) as f64;
    let bottom = -(camera.y + view.y).min(world_size) as f64;
    let left = camera.x.max(0.0) as f64;
    let right = (camera.x + view.x).min(world_size) as f64;

    let mut x = (camera.x / spacing).ceil().max(0.0) * spacing;
    while x <= (camera.x + view.x).min(world_size) {
        ctx.draw(&CanvasLine {
            x1: x as f64,
            y1: bottom,
            x2: x as f64,
            y2: top,
            color,
        });
        x += spacing;
    }

    let mut y = (camera.y / spacing).ceil().max(0.0) * spacing;
    while y <= (camera.y + view.y).min(world_size) {
        ctx.draw(&CanvasLine {
            x1: left,
            y1: -y as f64,
            x2: right,
            y2: -y as f64,
            color,
        });
        y += spacing;
    }
}

fn draw_ship(ctx: &mut Context, ship: &Ship, frame_no: u64, labelled: bool) {
    let color = rgb(ship.color);
    let radius = ship.hit_radius();
    let (x, y) = plot(ship.body.pos);

    if ship.aura_radius > 0.0 {
        ctx.draw(&Circle {
            x,
            y,
            radius: ship.aura_radius as f64,
            color: Color::DarkGray,
        });
    }

    ctx.draw(&Circle {
        x,
        y,
        radius: radius as f64,
        color,
    });
    let (cx, cy) = plot(ship.body.pos + Vec2::from_angle(ship.angle) * (radius + 10.0));
    ctx.draw(&CanvasLine {
        x1: x,
        y1: y,
        x2: cx,
        y2: cy,
        color: Color::White,
    });

    for point in ship.orbital_points(frame_no) {
        let (ox, oy) = plot(point);
        ctx.draw(&Circle {
            x: ox,
            y: oy,
            radius: ORBITAL_RADIUS as f64,
            color: Color::White,
        });
    }

    if labelled {
        let (lx, ly) = plot(ship.body.pos - Vec2::new(radius, radius + 16.0));
        let style = Style::default().fg(Color::White);
        ctx.print(lx, ly, Line::styled(format!("{} [{}]", ship.name, ship.level), style));

        let (start, split, end) = health_bar(ship);
        for (from, to, color) in [(start, split, Color::Green), (split, end, Color::Red)] {
            if from != to {
                let ((x1, y1), (x2, y2)) = (plot(from), plot(to));
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                });
            }
        }
    }
}

/// Health bar between a ship and its label as (left end, end of the
/// remaining health, right end), in world units
fn health_bar(ship: &Ship) -> (Vec2, Vec2, Vec2) {
    let radius = ship.hit_radius();
    let start = ship.body.pos - Vec2::new(radius, radius + 8.0);
    let width = radius * 2.0;
    let fill = if ship.max_hp > 0.0 {
        (ship.hp / ship.max_hp).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (
        start,
        start + Vec2::new(width * fill, 0.0),
        start + Vec2::new(width, 0.0),
    )
}

fn render_card(frame: &mut Frame, area: Rect, index: usize, upgrade: &Upgrade) {
    let rarity = upgrade.rarity();
    let color = rarity_color(rarity);
    let text = vec![
        Line::from(format!("[{}]", index + 1)).centered().bold(),
        Line::from(""),
        Line::from(upgrade.title()).centered().fg(color).bold(),
        Line::from(upgrade.description()).centered().white(),
        Line::from(""),
        Line::from(rarity.get_name()).centered().fg(color),
    ];
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        ),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::{Terminal, backend::TestBackend};

    fn arena() -> Arena {
        let mut config = ArenaConfig::default();
        config.spawning.enabled = false;
        let mut arena = Arena::empty(config, "Tester", StdRng::seed_from_u64(3));
        arena.add_bot(Vec2::new(2100.0, 2000.0), "Neo");
        arena.add_asteroid(Vec2::new(1900.0, 1950.0), 2);
        arena.add_orb(Vec2::new(2000.0, 2100.0), 10);
        arena
    }

    fn draw(arena: &Arena, phase: Phase) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| {
                let view = RenderView {
                    phase,
                    arena,
                    area: frame.area(),
                    fps: 60,
                    elapsed_time_secs: 75,
                };
                GameRenderer::new().render(frame, &view);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_layout_splits_screen() {
        let layout = ScreenLayout::new(Rect::new(0, 0, 100, 30), 10);
        assert_eq!(layout.hud.height, 1);
        assert_eq!(layout.world, Rect::new(0, 2, 76, 27));
        assert_eq!(layout.leaderboard.x, 76);
        assert_eq!(layout.minimap.height, 12);
        assert_eq!(layout.controls.y, 29);
    }

    #[test]
    fn test_health_bar_scales_with_hp() {
        let mut arena = arena();
        let player = arena.player_mut();
        player.hp = player.max_hp / 4.0;

        let (start, split, end) = health_bar(arena.player());
        assert_eq!(start, Vec2::new(1980.0, 1972.0));
        assert_eq!(end, Vec2::new(2020.0, 1972.0));
        assert_eq!(split, Vec2::new(1990.0, 1972.0));

        arena.player_mut().hp = 0.0;
        let (start, split, _) = health_bar(arena.player());
        assert_eq!(split, start);
    }

    #[test]
    fn test_hud_shows_player_stats() {
        let screen = draw(&arena(), Phase::Playing);
        assert!(screen.contains("Tester"));
        assert!(screen.contains("Score:"));
        assert!(screen.contains("01:15"));
        assert!(screen.contains("Leaderboard"));
    }

    #[test]
    fn test_upgrade_modal_lists_offers() {
        let mut arena = arena();
        arena.player_mut().xp = 100;
        arena.tick(&Default::default());
        let SimState::AwaitingUpgradeChoice { offers, .. } = arena.state().clone() else {
            panic!("expected an upgrade offer");
        };

        let screen = draw(&arena, Phase::ChoosingUpgrade);
        assert!(screen.contains("LEVEL UP!"));
        for upgrade in offers {
            assert!(screen.contains(upgrade.title()));
        }
    }

    #[test]
    fn test_game_over_screen() {
        let arena = arena();
        let screen = draw(&arena, Phase::GameOver);
        assert!(screen.contains("YOU DIED"));
        assert!(screen.contains("Press R to restart"));
    }

    #[test]
    fn test_pause_overlay() {
        let screen = draw(&arena(), Phase::Paused);
        assert!(screen.contains("PAUSED"));
    }

    #[test]
    fn test_centered_clips_to_area() {
        let rect = centered(Rect::new(0, 0, 20, 10), 30, 4);
        assert_eq!(rect, Rect::new(0, 3, 20, 4));
    }
}
