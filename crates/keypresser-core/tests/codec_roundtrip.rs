//! Integration tests for the keypresser-core frame codec.
//!
//! Every command variant is encoded through the public API and decoded back,
//! and the emitter helpers are checked against the frames they produce.

use keypresser_core::{
    decode_frame, encode_command,
    keymap::{key_code, ModifierPreset},
    Command, EmitterConfig, KeyStroke, MouseButtons,
};

fn roundtrip(cmd: Command) -> Command {
    let frame = encode_command(&cmd).expect("encode must succeed");
    assert!(frame.starts_with('<') && frame.ends_with('>'), "{frame}");
    decode_frame(&frame).expect("decode must succeed")
}

#[test]
fn test_roundtrip_every_variant() {
    let commands = vec![
        Command::PressKey("58".into()),
        Command::ReleaseKey("58".into()),
        Command::TypeString("Hello there".into()),
        Command::PressCombination(vec!["129".into(), "65".into()]),
        Command::Delay(0),
        Command::Delay(u32::MAX),
        Command::MouseMove { dx: i32::MIN, dy: 300 },
        Command::MousePress(MouseButtons::left()),
        Command::MouseRelease(MouseButtons(MouseButtons::LEFT | MouseButtons::MIDDLE)),
        Command::MouseClick {
            buttons: MouseButtons::all(),
            count: 5,
        },
        Command::MouseWheel(-120),
    ];

    for cmd in commands {
        assert_eq!(roundtrip(cmd.clone()), cmd);
    }
}

#[test]
fn test_ctrl_space_combination_frame() {
    let cmd = Command::PressCombination(vec!["128".into(), "44".into()]);
    assert_eq!(encode_command(&cmd).unwrap(), "<3,128,44>");
}

#[test]
fn test_slot_with_preset_encodes_modifiers_before_key() {
    // Arrange
    let mut slot = EmitterConfig::new(key_code("Delete").expect("known key"));
    slot.modifiers = ModifierPreset::CtrlAlt.codes().to_vec();

    // Act
    let frame = match slot.keystroke() {
        KeyStroke::Combination(codes) => encode_command(&Command::combination(&codes)).unwrap(),
        KeyStroke::Single(_) => panic!("expected a combination"),
    };

    // Assert
    assert_eq!(frame, "<3,128,130,76>");
}

#[test]
fn test_slot_without_preset_is_single_press() {
    let slot = EmitterConfig::new(key_code("F5").expect("known key"));
    match slot.keystroke() {
        KeyStroke::Single(code) => {
            assert_eq!(encode_command(&Command::press_key(code)).unwrap(), "<0,62>");
            assert_eq!(encode_command(&Command::release_key(code)).unwrap(), "<1,62>");
        }
        KeyStroke::Combination(_) => panic!("expected a single key"),
    }
}
