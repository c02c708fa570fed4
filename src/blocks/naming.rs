//! Storage key naming for Lua module blocks.
//!
//! A Lua block is an ordinary configuration block whose name carries the
//! module type behind a fixed prefix. The bare prefix (empty module type) is
//! also the discriminator used to classify stored blocks.

const LUA_BLOCK_PREFIX: &str = "lua-";

/// Storage key for the Lua block of the given module type.
pub fn lua_block_name(module_type: &str) -> String {
    format!("{}{}", LUA_BLOCK_PREFIX, module_type)
}

/// Whether a stored block name denotes a Lua block.
pub fn is_lua_block(name: &str) -> bool {
    name.starts_with(LUA_BLOCK_PREFIX)
}

/// Module type encoded in a Lua block name, or `None` for other blocks.
pub fn lua_module_type(name: &str) -> Option<&str> {
    name.strip_prefix(LUA_BLOCK_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lua_block_name() {
        assert_eq!(lua_block_name("server"), "lua-server");
        assert_eq!(lua_block_name("worker"), "lua-worker");
        assert_eq!(lua_block_name(""), "lua-");
    }

    #[test]
    fn test_bare_prefix_is_lua_block() {
        assert!(is_lua_block(&lua_block_name("")));
        assert_eq!(lua_module_type("lua-"), Some(""));
    }

    #[test]
    fn test_plain_names_are_not_lua_blocks() {
        for name in ["server", "http", "root", "lua", "Lua-server", " lua-x", ""] {
            assert!(!is_lua_block(name), "{name:?} classified as lua block");
            assert_eq!(lua_module_type(name), None);
        }
    }

    #[test]
    fn test_prefix_stripped_once() {
        assert_eq!(lua_module_type("lua-lua-x"), Some("lua-x"));
    }

    proptest! {
        #[test]
        fn prop_module_type_round_trips(module_type in ".*") {
            let name = lua_block_name(&module_type);
            prop_assert!(is_lua_block(&name));
            prop_assert_eq!(lua_module_type(&name), Some(module_type.as_str()));
        }

        #[test]
        fn prop_unprefixed_names_rejected(name in "[^l].*|l[^u].*|lu[^a].*|lua[^-].*") {
            prop_assert!(!is_lua_block(&name));
        }
    }
}
