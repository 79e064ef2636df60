use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use zonemix_lib::mixer::{PlaybackState, ZoneId};
use zonemix_lib::slot::AudioSlot;
use zonemix_lib::system::MusicSystem;
use zonemix_lib::zone::{MuteZoneId, ZoneKind};

pub struct StatusSnapshot {
    pub text: String,
}

pub fn status_text<S: AudioSlot>(system: &MusicSystem<S>) -> StatusSnapshot {
    let mixer = system.mixer();
    let state = match system.state() {
        PlaybackState::Playing => "▶ Playing",
        PlaybackState::Paused if system.is_paused() => "⏸ Paused",
        PlaybackState::Paused => "… Waiting",
        PlaybackState::FadeIn => "↗ Fading in",
        PlaybackState::FadeOut => "↘ Fading out",
        PlaybackState::CrossFade => "⇄ Cross-fading",
        PlaybackState::TrackEnding => "▶ Ending",
        PlaybackState::Idle => "■ Idle",
    };

    let track = mixer
        .active_slot()
        .and_then(|slot| slot.clip().map(|clip| (clip, slot.time())))
        .map(|(clip, time)| {
            format!(
                "{}  {} / {}",
                clip.name,
                format_time(time),
                format_time(clip.length)
            )
        })
        .unwrap_or_else(|| "-".to_string());

    let stack = mixer
        .stack()
        .iter()
        .filter_map(|id| system.zone(id).map(|zone| zone.name().to_string()))
        .collect::<Vec<_>>()
        .join(" > ");

    let wait = mixer
        .current_zone()
        .and_then(|id| system.zone(id))
        .and_then(|zone| zone.wait_remaining())
        .map(|seconds| format!("   next in {:.1}s", seconds))
        .unwrap_or_default();

    let zones = system
        .zones()
        .iter()
        .enumerate()
        .map(|(index, zone)| {
            let marker = if system.is_inside(zone.id()) {
                " (inside)"
            } else if matches!(zone.kind(), ZoneKind::Global { .. }) {
                " (global)"
            } else {
                ""
            };
            format!("[{}] {}{}", index + 1, zone.name(), marker)
        })
        .chain(system.mute_zones().iter().map(|mute| {
            let index = system.zones().len() + mute.id().index();
            let marker = if system.is_inside_mute(mute.id()) {
                " (inside)"
            } else {
                ""
            };
            format!("[{}] {} (mute){}", index + 1, mute.name(), marker)
        }))
        .collect::<Vec<_>>()
        .join("  ");

    let text = format!(
        "{}   {}{}\nStack: {}\nZones: {}",
        state,
        track,
        wait,
        if stack.is_empty() { "-" } else { stack.as_str() },
        zones
    );

    StatusSnapshot { text }
}

/// Poll one key press and apply it. Returns `false` when the user quits.
pub fn handle_key_event<S: AudioSlot>(system: &mut MusicSystem<S>) -> bool {
    if event::poll(Duration::from_millis(50)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return true;
            }
            match key.code {
                KeyCode::Char('q') => {
                    return false;
                }
                KeyCode::Char(' ') => {
                    if system.is_paused() {
                        system.unpause();
                    } else {
                        system.pause();
                    }
                }
                KeyCode::Char('h') | KeyCode::Char('H') => {
                    system.hard_pause();
                }
                KeyCode::Char(digit @ '1'..='9') => {
                    let index = digit as usize - '1' as usize;
                    let zones = system.zones().len();
                    if index < zones {
                        let id = ZoneId::new(index);
                        if system.is_inside(id) {
                            system.exit_zone(id);
                        } else {
                            system.enter_zone(id);
                        }
                    } else if index - zones < system.mute_zones().len() {
                        let id = MuteZoneId::new(index - zones);
                        if system.is_inside_mute(id) {
                            system.exit_mute_zone(id);
                        } else {
                            system.enter_mute_zone(id);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    true
}

fn format_time(seconds: f32) -> String {
    let seconds = seconds.max(0.0).ceil() as u32;
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
