#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::{
    TEST_PASSWORD, fund_account, get_balance, get_test_app_state, get_test_server, register,
};
