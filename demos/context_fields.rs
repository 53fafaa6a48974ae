//! Deriving fields from a request context.

use tierlog::{Context, Encoding, Level, fields, global};

fn handle(ctx: &Context, path: &str) {
    global::info_context(ctx, "handling %s", &[&path]);
    global::warn_context_with_fields(ctx, fields! { "slow" => true }, "took %dms", &[&250]);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    global::configure(|logger| {
        logger.set_level(Level::Debug).set_encoding(Encoding::Json);
    });
    global::try_init_logger()?;
    global::add_field_fn(|ctx, fields| {
        for key in ["req_id", "user"] {
            if let Some(value) = ctx.value(key) {
                fields.insert(key.to_string(), value.clone());
            }
        }
    });

    let root = Context::new().with_value("req_id", "7f3a");
    handle(&root, "/health");
    handle(&root.with_value("user", "alice"), "/api/orders");

    global::flush()?;
    Ok(())
}
