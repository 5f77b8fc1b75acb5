// Licensed under the Apache-2.0 license

mod common;
mod test_reset_device;
mod test_reset_device_pin;
mod test_reset_failures;
