pub static TEST_API_KEY: &str = "test_api_key";
pub static TEST_API_KEY_2: &str = "test_api_key_2";
