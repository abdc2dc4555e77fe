//! Default service registrations.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::GameConfig;
use crate::hud::Hud;
use crate::services::ServiceLocator;
use crate::sound::{AudioOutput, NullSink, SoundBank, SoundManager};

/// Register the standard capabilities on `locator`. The sound manager
/// resolves its bank, config and output through the locator, and falls back
/// to defaults if any of them is missing.
pub fn register_factories(locator: &ServiceLocator, config: GameConfig, output: AudioOutput) {
    let config = Rc::new(config);
    locator.add_instance(config);

    locator.add_factory(|sl: &ServiceLocator| {
        let config = sl.get_service::<GameConfig>().unwrap_or_default();
        SoundBank::from_config(&config.sound)
    });

    locator.add_factory(move |_: &ServiceLocator| output.clone());

    locator.add_factory(|sl: &ServiceLocator| {
        let config = sl.get_service::<GameConfig>().unwrap_or_default();
        let bank = sl.get_service::<SoundBank>().unwrap_or_default();
        let output = sl
            .get_service::<AudioOutput>()
            .map(|output| (*output).clone())
            .unwrap_or_else(|| AudioOutput::new(NullSink));
        RefCell::new(SoundManager::new(bank, output, &config.sound))
    });

    locator.add_factory(|_: &ServiceLocator| RefCell::new(Hud::new()));
}
