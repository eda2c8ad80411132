//! PWM output, GPIO interrupt setup, indicator LED and task spawning.

pub mod hw_init;
pub mod indicator;
pub mod pwm;
pub mod task_pin;
