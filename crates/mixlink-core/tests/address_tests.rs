//! Address mapping and label tests

use mixlink_core::{address, channel_label, device_path, variable_id, Direction, VariableKind};

#[test]
fn test_device_path_appends_name() {
    assert_eq!(device_path("/gain/input/2/5", "unit1"), "/gain/input/2/5/unit1");
    assert_eq!(device_path("/ping", "main mixer"), "/ping/main mixer");
}

#[test]
fn test_variable_id_mapping() {
    assert_eq!(variable_id("/gain/input/2/5/unit1", "unit1"), "gain_input_2_5");
    assert_eq!(variable_id("/mute/output/3/unit1", "unit1"), "mute_output_3");
    assert_eq!(variable_id("/ping/unit1", "unit1"), "ping");
}

#[test]
fn test_variable_id_without_device_suffix() {
    // paths without the suffix map as-is
    assert_eq!(variable_id("/gain/input/2/5", "unit1"), "gain_input_2_5");
    // an empty device name never strips anything
    assert_eq!(variable_id("/gain/output/1", ""), "gain_output_1");
}

#[test]
fn test_known_labels() {
    let cases = [
        ("gain_input_2_5", "Gain: Analog in 2 -> Dante out 1"),
        ("gain_input_5_2", "Gain: Dante in 1 -> Analog out 2"),
        ("gain_output_6", "Gain: Dante out 2"),
        ("mute_input_1", "Mute: Analog in 1"),
        ("mute_output_8", "Mute: Dante out 4"),
        ("trim_3", "Trim: Analog in 3"),
        ("delay_7", "Delay: Dante out 3"),
        ("phase_input_4", "Phase: Analog in 4"),
        ("phase_output_5", "Phase: Dante out 1"),
        ("eqenable_input_2", "EQ Enable: Analog in 2"),
        ("eqenable_output_2", "EQ Enable: Analog out 2"),
        ("comp_threshold_input_1", "Comp Threshold: Analog in 1"),
        ("comp_ratio_output_6", "Comp Ratio: Dante out 2"),
        ("eq_gain_input_2_3", "EQ Gain: Analog in 2 Band 3"),
        ("eq_gain_output_5_1", "EQ Gain: Dante out 1 Band 1"),
    ];
    for (id, want) in cases {
        assert_eq!(address::label_for(id), want, "label for {id}");
    }
}

#[test]
fn test_label_never_fails() {
    // out-of-range channels, missing segments, arbitrary junk all fall back
    for id in [
        "gain_input_0_5",
        "gain_input_9_1",
        "mute_input",
        "",
        "weird_thing_42",
        "GAIN_INPUT_1_1",
    ] {
        let label = address::label_for(id);
        assert!(!label.is_empty() || id.is_empty(), "label for {id:?}");
    }
    assert_eq!(address::label_for("gain_input_9_1"), "Gain Input 9 1");
}

#[test]
fn test_parse_shapes() {
    assert_eq!(
        VariableKind::parse("gain_input_2_5"),
        VariableKind::CrosspointGain { input: 2, output: 5 }
    );
    assert_eq!(
        VariableKind::parse("comp_attack_output_7"),
        VariableKind::Comp {
            param: "attack".to_string(),
            direction: Direction::Output,
            channel: 7
        }
    );
    assert_eq!(
        VariableKind::parse("not_a_thing"),
        VariableKind::Unknown("not_a_thing".to_string())
    );
}

#[test]
fn test_channel_label_partition() {
    assert_eq!(channel_label(4, Direction::Input), "Analog in 4");
    assert_eq!(channel_label(5, Direction::Input), "Dante in 1");
    assert_eq!(channel_label(5, Direction::Output), "Dante out 1");
    assert_eq!(channel_label(1, Direction::Output), "Analog out 1");
}
