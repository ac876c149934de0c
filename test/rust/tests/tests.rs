mod set_token_tests;
mod simulation_tests;
