/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeyAction::Single(Action::Key(KeyCode::A))`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Key($crate::keycode::KeyCode::$k))
    };
}

/// Create a normal key with modifier action
#[macro_export]
macro_rules! wm {
    ($x: ident, $m: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::KeyWithModifier(
            $crate::keycode::KeyCode::$x,
            $m,
        ))
    };
}

/// Create a shifted key
#[macro_export]
macro_rules! shifted {
    ($x: ident) => {
        $crate::wm!($x, $crate::modifier::ModifierCombination::LSHIFT)
    };
}

/// Create a normal action: `KeyAction`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::KeyAction::$a
    };
}

/// Create a layer activate action. For example, `mo!(1)` activates layer 1 while the key is held.
#[macro_export]
macro_rules! mo {
    ($x: literal) => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerOn($x))
    };
}

/// Create a layer toggle only action (activate layer `n` and deactivate all other layers), `n` is the layer number
#[macro_export]
macro_rules! to {
    ($x: literal) => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerTo($x))
    };
}

/// Go to the next layer, from the last layer back to layer 0
#[macro_export]
macro_rules! lcy_p {
    () => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerNext)
    };
}

/// Go to the previous layer, from layer 0 to the last layer
#[macro_export]
macro_rules! lcy_m {
    () => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerPrev)
    };
}

/// Create a rapid fire key, `n` is the index in the rapid fire config
#[macro_export]
macro_rules! rf {
    ($x: literal) => {
        $crate::action::KeyAction::RapidFire($x)
    };
}

/// Create a tap dance key, `n` is the index in the tap dance config
#[macro_export]
macro_rules! td {
    ($x: literal) => {
        $crate::action::KeyAction::TapDance($x)
    };
}

/// Create a macro trigger key, `n` is the index in the macro config
#[macro_export]
macro_rules! mcr {
    ($x: literal) => {
        $crate::action::KeyAction::Single($crate::action::Action::TriggerMacro($x))
    };
}

/// Create a status light adjustment key. For example, `light!(ValueUp)`
#[macro_export]
macro_rules! light {
    ($x: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Light($crate::action::LightAction::$x))
    };
}

/// Create an encoder action, the arguments are the clockwise, counter-clockwise and push actions
#[macro_export]
macro_rules! encoder {
    ($clockwise: expr, $counter_clockwise: expr) => {
        $crate::action::EncoderAction::new($clockwise, $counter_clockwise, $crate::action::KeyAction::No)
    };
    ($clockwise: expr, $counter_clockwise: expr, $push: expr) => {
        $crate::action::EncoderAction::new($clockwise, $counter_clockwise, $push)
    };
}
