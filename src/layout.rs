//! Keyboard layout of the per-key color buffer.
//!
//! The controller expects 128 slots of four bytes each. Every slot starts with
//! a zero pad byte followed by the red, green and blue channel. Slots without a
//! physical key are left zeroed.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::Error;

/// Number of slots in the custom color buffer.
pub const SLOT_COUNT: usize = 128;

/// Bytes occupied by a single slot.
pub const SLOT_SIZE: usize = 4;

/// Size of the custom color buffer.
pub const BUFFER_SIZE: usize = SLOT_COUNT * SLOT_SIZE;

/// Physical key known to the controller.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Copy, Clone)]
pub enum KeyName {
    LCtrl,
    LShift,
    Caps,
    Tab,
    Grave,
    Esc,
    Fn,
    Iso,
    A,
    Q,
    Num1,
    F1,
    Gui,
    Z,
    S,
    W,
    Num2,
    F2,
    LAlt,
    X,
    D,
    E,
    Num3,
    F3,
    C,
    F,
    R,
    Num4,
    F4,
    V,
    G,
    T,
    Num5,
    F5,
    Space,
    B,
    H,
    Y,
    Num6,
    F6,
    N,
    J,
    U,
    Num7,
    F7,
    M,
    K,
    I,
    Num8,
    F8,
    RAlt,
    Comma,
    L,
    O,
    Num9,
    F9,
    App,
    Period,
    Semicolon,
    P,
    Num0,
    F10,
    RCtrl,
    Slash,
    Quote,
    LBracket,
    Minus,
    F11,
    RBracket,
    Equal,
    F12,
    Left,
    RShift,
    Backslash,
    Pause,
    Down,
    Up,
    Enter,
    Backspace,
    Delete,
    Right,
    Kp1,
    Kp4,
    Kp7,
    NumLock,
    Home,
    Kp0,
    Kp2,
    Kp5,
    Kp8,
    KpSlash,
    PageUp,
    KpPeriod,
    Kp3,
    Kp6,
    Kp9,
    KpAsterisk,
    PageDown,
    KpEnter,
    KpPlus,
    KpMinus,
    End,
}

impl KeyName {
    /// All keys, in declaration order.
    #[rustfmt::skip]
    pub const ALL: [KeyName; 102] = {
        use KeyName::*;
        [
            LCtrl, LShift, Caps, Tab, Grave, Esc, Fn, Iso, A, Q, Num1, F1, Gui, Z, S, W, Num2, F2,
            LAlt, X, D, E, Num3, F3, C, F, R, Num4, F4, V, G, T, Num5, F5, Space, B, H, Y, Num6,
            F6, N, J, U, Num7, F7, M, K, I, Num8, F8, RAlt, Comma, L, O, Num9, F9, App, Period,
            Semicolon, P, Num0, F10, RCtrl, Slash, Quote, LBracket, Minus, F11, RBracket, Equal,
            F12, Left, RShift, Backslash, Pause, Down, Up, Enter, Backspace, Delete, Right, Kp1,
            Kp4, Kp7, NumLock, Home, Kp0, Kp2, Kp5, Kp8, KpSlash, PageUp, KpPeriod, Kp3, Kp6, Kp9,
            KpAsterisk, PageDown, KpEnter, KpPlus, KpMinus, End,
        ]
    };

    /// Number of keys in the layout.
    pub const COUNT: usize = Self::ALL.len();

    /// Name used by the CLI and color map files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LCtrl => "lctrl",
            Self::LShift => "lshift",
            Self::Caps => "caps",
            Self::Tab => "tab",
            Self::Grave => "`",
            Self::Esc => "esc",
            Self::Fn => "fn",
            Self::Iso => "iso",
            Self::A => "a",
            Self::Q => "q",
            Self::Num1 => "1",
            Self::F1 => "f1",
            Self::Gui => "gui",
            Self::Z => "z",
            Self::S => "s",
            Self::W => "w",
            Self::Num2 => "2",
            Self::F2 => "f2",
            Self::LAlt => "lalt",
            Self::X => "x",
            Self::D => "d",
            Self::E => "e",
            Self::Num3 => "3",
            Self::F3 => "f3",
            Self::C => "c",
            Self::F => "f",
            Self::R => "r",
            Self::Num4 => "4",
            Self::F4 => "f4",
            Self::V => "v",
            Self::G => "g",
            Self::T => "t",
            Self::Num5 => "5",
            Self::F5 => "f5",
            Self::Space => "space",
            Self::B => "b",
            Self::H => "h",
            Self::Y => "y",
            Self::Num6 => "6",
            Self::F6 => "f6",
            Self::N => "n",
            Self::J => "j",
            Self::U => "u",
            Self::Num7 => "7",
            Self::F7 => "f7",
            Self::M => "m",
            Self::K => "k",
            Self::I => "i",
            Self::Num8 => "8",
            Self::F8 => "f8",
            Self::RAlt => "ralt",
            Self::Comma => ",",
            Self::L => "l",
            Self::O => "o",
            Self::Num9 => "9",
            Self::F9 => "f9",
            Self::App => "app",
            Self::Period => ".",
            Self::Semicolon => ";",
            Self::P => "p",
            Self::Num0 => "0",
            Self::F10 => "f10",
            Self::RCtrl => "rctrl",
            Self::Slash => "/",
            Self::Quote => "'",
            Self::LBracket => "[",
            Self::Minus => "-",
            Self::F11 => "f11",
            Self::RBracket => "]",
            Self::Equal => "=",
            Self::F12 => "f12",
            Self::Left => "left",
            Self::RShift => "rshift",
            Self::Backslash => "\\",
            Self::Pause => "pause",
            Self::Down => "down",
            Self::Up => "up",
            Self::Enter => "enter",
            Self::Backspace => "bksp",
            Self::Delete => "del",
            Self::Right => "right",
            Self::Kp1 => "k1",
            Self::Kp4 => "k4",
            Self::Kp7 => "k7",
            Self::NumLock => "num",
            Self::Home => "home",
            Self::Kp0 => "k0",
            Self::Kp2 => "k2",
            Self::Kp5 => "k5",
            Self::Kp8 => "k8",
            Self::KpSlash => "k/",
            Self::PageUp => "pgup",
            Self::KpPeriod => "k.",
            Self::Kp3 => "k3",
            Self::Kp6 => "k6",
            Self::Kp9 => "k9",
            Self::KpAsterisk => "k*",
            Self::PageDown => "pgdn",
            Self::KpEnter => "kenter",
            Self::KpPlus => "k+",
            Self::KpMinus => "k-",
            Self::End => "end",
        }
    }
}

impl FromStr for KeyName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name() == name)
            .ok_or_else(|| Error::InvalidKey(s.to_string()))
    }
}

impl Display for KeyName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key assigned to every slot of the color buffer.
///
/// The controller walks its key matrix column by column, six rows at a time.
#[rustfmt::skip]
pub const KEYS: [Option<KeyName>; SLOT_COUNT] = {
    use KeyName::*;
    [
        None,        None,         None,       None,       None,         None,
        Some(LCtrl), Some(LShift), Some(Caps), Some(Tab),  Some(Grave),  Some(Esc),
        Some(Fn),    Some(Iso),    Some(A),    Some(Q),    Some(Num1),   Some(F1),
        Some(Gui),   Some(Z),      Some(S),    Some(W),    Some(Num2),   Some(F2),
        Some(LAlt),  Some(X),      Some(D),    Some(E),    Some(Num3),   Some(F3),
        None,        Some(C),      Some(F),    Some(R),    Some(Num4),   Some(F4),
        None,        Some(V),      Some(G),    Some(T),    Some(Num5),   Some(F5),
        Some(Space), Some(B),      Some(H),    Some(Y),    Some(Num6),   Some(F6),
        None,        Some(N),      Some(J),    Some(U),    Some(Num7),   Some(F7),
        None,        Some(M),      Some(K),    Some(I),    Some(Num8),   Some(F8),
        Some(RAlt),  Some(Comma),  Some(L),    Some(O),    Some(Num9),   Some(F9),
        Some(App),   Some(Period), Some(Semicolon), Some(P), Some(Num0), Some(F10),
        Some(RCtrl), Some(Slash),  Some(Quote), Some(LBracket), Some(Minus), Some(F11),
        None,        None,         None,       Some(RBracket), Some(Equal), Some(F12),
        Some(Left),  Some(RShift), Some(Backslash), None, None,         Some(Pause),
        Some(Down),  Some(Up),     Some(Enter), None,      Some(Backspace), Some(Delete),
        Some(Right), Some(Kp1),    Some(Kp4),  Some(Kp7),  Some(NumLock), Some(Home),
        Some(Kp0),   Some(Kp2),    Some(Kp5),  Some(Kp8),  Some(KpSlash), Some(PageUp),
        Some(KpPeriod), Some(Kp3), Some(Kp6),  Some(Kp9),  Some(KpAsterisk), Some(PageDown),
        Some(KpEnter), None,       Some(KpPlus), None,     Some(KpMinus), Some(End),
        None, None, None, None, None, None, None, None,
    ]
};

/// Offset of each key's red channel, indexed by key discriminant.
///
/// Fails to compile if a key has no slot or occupies more than one.
const OFFSETS: [usize; KeyName::COUNT] = {
    let mut offsets = [usize::MAX; KeyName::COUNT];

    let mut slot = 0;
    while slot < SLOT_COUNT {
        if let Some(key) = KEYS[slot] {
            assert!(offsets[key as usize] == usize::MAX, "key assigned to multiple slots");
            offsets[key as usize] = slot * SLOT_SIZE + 1;
        }
        slot += 1;
    }

    let mut key = 0;
    while key < KeyName::COUNT {
        assert!(offsets[key] != usize::MAX, "key without slot");
        key += 1;
    }

    offsets
};

/// Byte offset of a key's RGB triple within the color buffer.
pub const fn offset_of(key: KeyName) -> usize {
    OFFSETS[key as usize]
}
