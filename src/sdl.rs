use crate::display::{Display, HEIGHT, WIDTH};
use crate::host::{is_audible, Control, Host};
use crate::keypad::Keypad;
use log::{debug, warn};
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::{EventPump, Sdl};

const SAMPLE_RATE: i32 = 44_100;
const TONE_HZ: i32 = 440;
const VOLUME: f32 = 0.05;

// Square wave counted in whole samples, so the pitch never drifts
struct Beeper {
    half_period: u32,
    position: u32,
}

impl Beeper {
    fn new(sample_rate: i32) -> Beeper {
        Beeper {
            half_period: (sample_rate / TONE_HZ / 2).max(1) as u32,
            position: 0,
        }
    }
}

impl AudioCallback for Beeper {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            let high = self.position < self.half_period;
            *sample = if high { VOLUME } else { -VOLUME };
            self.position = (self.position + 1) % (2 * self.half_period);
        }
    }
}

// Hex keypad on the left of a QWERTY keyboard:
//   1 2 3 C      1 2 3 4
//   4 5 6 D  <-  Q W E R
//   7 8 9 E      A S D F
//   A 0 B F      Z X C V
pub fn keymap(key: Keycode) -> Option<u8> {
    match key {
        Keycode::Num1 => Some(0x1),
        Keycode::Num2 => Some(0x2),
        Keycode::Num3 => Some(0x3),
        Keycode::Num4 => Some(0xC),
        Keycode::Q => Some(0x4),
        Keycode::W => Some(0x5),
        Keycode::E => Some(0x6),
        Keycode::R => Some(0xD),
        Keycode::A => Some(0x7),
        Keycode::S => Some(0x8),
        Keycode::D => Some(0x9),
        Keycode::F => Some(0xE),
        Keycode::Z => Some(0xA),
        Keycode::X => Some(0x0),
        Keycode::C => Some(0xB),
        Keycode::V => Some(0xF),
        _ => None,
    }
}

/// Window, keyboard and beeper through SDL2.
pub struct SdlHost {
    _context: Sdl,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    audio_device: Option<AudioDevice<Beeper>>,
    scale: u32,
    beeping: bool,
}

impl SdlHost {
    pub fn new(title: &str, scale: u32) -> Result<SdlHost, String> {
        let context = sdl2::init()?;
        let video_subsystem = context.video()?;

        let window = video_subsystem
            .window(title, WIDTH as u32 * scale, HEIGHT as u32 * scale)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let event_pump = context.event_pump()?;

        // Run silently rather than refuse to start without an audio device
        let audio_device = match Self::open_audio(&context) {
            Ok(device) => Some(device),
            Err(err) => {
                warn!("no audio: {}", err);
                None
            }
        };

        debug!("sdl window open at scale {}", scale);
        Ok(SdlHost {
            _context: context,
            canvas,
            event_pump,
            audio_device,
            scale,
            beeping: false,
        })
    }

    fn open_audio(context: &Sdl) -> Result<AudioDevice<Beeper>, String> {
        let desired = AudioSpecDesired {
            freq: Some(SAMPLE_RATE),
            channels: Some(1),
            samples: None,
        };
        context
            .audio()?
            .open_playback(None, &desired, |obtained| Beeper::new(obtained.freq))
    }
}

impl Host for SdlHost {
    fn pump(&mut self, keypad: &mut Keypad) -> Control {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return Control::Quit,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => set_mapped_key(keypad, key, true),
                Event::KeyUp {
                    keycode: Some(key), ..
                } => set_mapped_key(keypad, key, false),
                // Key-up events go to whichever window has focus now
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => keypad.release_all(),
                _ => {}
            }
        }

        Control::Continue
    }

    fn present(&mut self, display: &Display) {
        self.canvas.set_draw_color(Color::BLACK);
        self.canvas.clear();
        self.canvas.set_draw_color(Color::WHITE);

        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if !display.get_pixel(x, y) {
                    continue;
                }

                let rect = Rect::new(
                    (x as u32 * self.scale) as i32,
                    (y as u32 * self.scale) as i32,
                    self.scale,
                    self.scale,
                );
                if let Err(err) = self.canvas.fill_rect(rect) {
                    warn!("draw failed: {}", err);
                    return;
                }
            }
        }

        self.canvas.present();
    }

    fn sound(&mut self, sound_timer: u8) {
        let audible = is_audible(sound_timer);
        if audible == self.beeping {
            return;
        }
        self.beeping = audible;

        match (&self.audio_device, audible) {
            (Some(device), true) => device.resume(),
            (Some(device), false) => device.pause(),
            (None, _) => {}
        }
    }
}

fn set_mapped_key(keypad: &mut Keypad, key: Keycode, pressed: bool) {
    if let Some(code) = keymap(key) {
        if let Err(err) = keypad.set_key(code, pressed) {
            warn!("key {:?} dropped: {}", key, err);
        }
    }
}
