pub mod worker_cache;
