use snowflake::SnowflakeIdGenerator;
use std::sync::Mutex;

static ID_GENERATOR: Mutex<Option<SnowflakeIdGenerator>> = Mutex::new(None);

/// Initialize the process-wide snowflake id generator.
///
/// `machine_id` and `node_id` are in the range 0-31. Calling this is
/// optional; an uninitialized generator falls back to (1, 1).
pub fn init(machine_id: i32, node_id: i32) {
    let mut gen = ID_GENERATOR.lock().unwrap();
    *gen = Some(SnowflakeIdGenerator::new(machine_id, node_id));
}

/// Generate a unique id, used for plugin instances created at startup.
pub fn next_id() -> String {
    let mut gen = ID_GENERATOR.lock().unwrap();
    let generator = gen.get_or_insert_with(|| SnowflakeIdGenerator::new(1, 1));
    generator.real_time_generate().to_string()
}
