mod web_routes;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - calendar_sources: iCal feed and Google Calendar sources against a mock HTTP server
// - chat_flow: The full message to prompt pipeline with stub calendar and model
// - web_routes: The HTTP routes and their status codes
