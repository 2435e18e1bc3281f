pub mod in_memory_client_registry;
