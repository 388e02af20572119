// End-to-end tests for the feed list API
//
// Each test gets its own SQLite file in a temporary directory and its own
// server bound to an OS-assigned port, so tests run in parallel without
// sharing state. The server is the real router from `build_router`.

mod helpers;
mod test_content_type;
