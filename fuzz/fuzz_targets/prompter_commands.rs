#![no_main]

use libfuzzer_sys::fuzz_target;
use teleprompt::core::PrompterCore;
use teleprompt::input::{Signal, dispatch};
use teleprompt::model::{Mode, SettingsPatch};

fuzz_target!(|data: &[u8]| {
    let mut core = PrompterCore::ephemeral();
    core.set_script("alpha beta gamma delta epsilon");
    let mut now_ms = 0u64;

    for byte in data {
        match byte % 10 {
            0 => dispatch(&mut core, Signal::Toggle),
            1 => core.stop(),
            2 => core.open_settings(),
            3 => core.close_settings(),
            4 => core.edit_script(|text| text.push(' ')),
            5 => core.update_settings(
                SettingsPatch::default().words_per_minute(f64::from(*byte) * 2.0),
            ),
            6 => core.toggle_auto_start(),
            7 => core.settle(),
            _ => {
                now_ms += u64::from(*byte) * 40;
                core.on_frame(now_ms);
            }
        }

        let progress = core.session().progress;
        assert!((0.0..=1.0).contains(&progress));
        if core.mode() == Mode::Input {
            assert!(!core.session().is_playing);
        }
        if core.mode().is_settings() {
            assert!(!core.session().is_playing);
        }
        let wpm = core.settings().words_per_minute;
        assert!((20.0..=240.0).contains(&wpm));
    }
});
